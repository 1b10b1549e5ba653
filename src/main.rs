use std::path::PathBuf;

use clap::Parser;
use listening_quiz::admin::DEFAULT_ADMIN_PASSPHRASE;
use listening_quiz::data::DEFAULT_STORE_PATH;
use listening_quiz::{Config, Quiz};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// JSON file the questions are loaded from and saved to
    #[arg(short, long, env = "LISTENING_QUIZ_STORE", default_value = DEFAULT_STORE_PATH)]
    store: PathBuf,

    /// Endpoint that receives a PUT of the full question list after every change
    #[arg(short, long, env = "LISTENING_QUIZ_REMOTE_URL")]
    remote_url: Option<String>,

    /// Passphrase that unlocks admin mode (a convenience gate, not a security boundary)
    #[arg(long, env = "LISTENING_QUIZ_ADMIN_PASSPHRASE", default_value = DEFAULT_ADMIN_PASSPHRASE, hide_default_value = true)]
    admin_passphrase: String,

    /// mpv-compatible program used to play question audio
    #[arg(short, long, env = "LISTENING_QUIZ_PLAYER")]
    player: Option<String>,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            store_path: args.store,
            remote_url: args.remote_url,
            admin_passphrase: args.admin_passphrase,
            player: args.player,
        }
    }
}

#[tokio::main]
async fn main() {
    pretty_env_logger::init();
    let args = Args::parse();

    let quiz = match Quiz::from_config(args.into()) {
        Ok(quiz) => quiz,
        Err(e) => {
            eprintln!("Error starting quiz: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = quiz.run().await {
        eprintln!("Error running quiz: {}", e);
        std::process::exit(1);
    }
}
