use std::env;
use std::io::{self, Write};
use std::sync::Arc;

use log::{error, info};

use over_under::audio::LogAudio;
use over_under::prefs::JsonPreferences;
use over_under::{
    DragSample, FeedPhase, SessionController, SqliteStore, SwipeOutcome, Topic, VoteStore,
};

const STARTER_TOPICS: &[(&str, &str, &str)] = &[
    ("Pumpkin spice lattes", "🎃", "Food"),
    ("Pineapple on pizza", "🍍", "Food"),
    ("Fantasy football", "🏈", "Sports"),
    ("Pickleball", "🎾", "Sports"),
    ("True crime podcasts", "🎙️", "Pop Culture"),
    ("Vinyl records", "💿", "Music"),
    ("Superhero movies", "🦸", "Movies"),
    ("Reality dating shows", "📺", "TV"),
    ("Standing desks", "🧍", "Technology"),
    ("Group chats", "💬", "Social Media"),
];

async fn seed_if_empty(store: &SqliteStore) -> Result<(), over_under::StoreError> {
    if !store.fetch_topics().await?.is_empty() {
        return Ok(());
    }
    info!("seeding starter topics");
    for (text, emoji, category) in STARTER_TOPICS {
        store.insert_topic(&Topic::new(*text, *emoji, *category)).await?;
    }
    Ok(())
}

fn print_card(controller: &SessionController) {
    match controller.phase() {
        FeedPhase::Loading => println!("loading..."),
        FeedPhase::Failed(msg) => println!("couldn't load topics ({msg}) — type `retry`"),
        FeedPhase::Exhausted => {
            println!("🎉 you're all caught up! type `restart` to start over, `board` for the leaderboard")
        }
        FeedPhase::Ready => {
            if let Some(topic) = controller.current_topic() {
                println!();
                println!("  {}  {}  [{}]", topic.emoji, topic.text, topic.category);
                println!("  ← underrated   ↑ skip   overrated →   (l / u / r)");
            }
        }
    }
}

fn sample_for(key: &str) -> Option<DragSample> {
    // Synthesized release samples, well past both thresholds.
    match key {
        "r" => Some(DragSample { offset_x: 120.0, ..Default::default() }),
        "l" => Some(DragSample { offset_x: -120.0, ..Default::default() }),
        "u" => Some(DragSample { offset_y: -120.0, ..Default::default() }),
        _ => None,
    }
}

#[tokio::main]
async fn main() {
    // Initialize logging
    dotenvy::dotenv().ok();
    env_logger::init();

    let store = match SqliteStore::from_env().await {
        Ok(store) => Arc::new(store),
        Err(e) => {
            error!("failed to initialize vote store: {e}");
            return;
        }
    };
    if let Err(e) = seed_if_empty(&store).await {
        error!("failed to seed topics: {e}");
        return;
    }

    let prefs_path = env::var("OVERUNDER_PREFS").unwrap_or_else(|_| "over_under_prefs.json".to_string());
    let prefs = Arc::new(JsonPreferences::open(prefs_path));

    let mut controller = SessionController::new(store, Arc::new(LogAudio), prefs);
    controller.start().await;

    println!("over/under — swipe with l / u / r, enter to continue, `board`, `restart`, `q`");
    print_card(&controller);

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();

        match input {
            "q" | "quit" => break,
            "retry" | "restart" => {
                controller.restart().await;
                print_card(&controller);
            }
            "reset" => {
                controller.reset().await;
                print_card(&controller);
            }
            "board" => {
                if let Some(board) = controller.leaderboard().await {
                    println!("most overrated:");
                    for entry in &board.most_overrated {
                        println!("  {:>3}%  {}", entry.overrated_percent, entry.topic.text);
                    }
                    println!("most underrated:");
                    for entry in &board.most_underrated {
                        println!("  {:>3}%  {}", 100 - entry.overrated_percent, entry.topic.text);
                    }
                }
            }
            "" => {
                // Tap to continue past a resolved card.
                if controller.advance() {
                    print_card(&controller);
                }
            }
            key => match sample_for(key) {
                Some(sample) => match controller.swipe(sample).await {
                    SwipeOutcome::Resolved(result) => {
                        println!(
                            "  {}% overrated / {}% underrated ({} votes) — press enter",
                            result.overrated_percent,
                            result.underrated_percent,
                            result.total_votes
                        );
                        if let Some(topic) = controller.current_topic() {
                            let comments = controller.comments(&topic.id).await;
                            for comment in comments.iter().take(3) {
                                println!("  💬 {} (+{})", comment.text, comment.upvotes);
                            }
                        }
                    }
                    SwipeOutcome::SnapBack => println!("  (snap back)"),
                    SwipeOutcome::Dropped => {}
                },
                None => println!("  l / u / r to swipe, enter to continue, q to quit"),
            },
        }
        let _ = io::stdout().flush();
    }
}
