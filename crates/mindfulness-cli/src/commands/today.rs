use chrono::Local;
use clap::Args;
use mindfulness_core::{Config, Dashboard, Theme};

#[derive(Args)]
pub struct TodayArgs {
    /// Like today's affirmation this many times
    #[arg(long, default_value_t = 0)]
    like: u32,
    /// Switch between light and dark for this run
    #[arg(long)]
    toggle_theme: bool,
    /// Seed for a reproducible affirmation and quote
    #[arg(long)]
    seed: Option<u64>,
    /// Print the dashboard as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: TodayArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let theme = Theme::from_dark_mode(config.ui.dark_mode);
    let mut board = Dashboard::with_seed(args.seed, Local::now().date_naive(), theme);

    let mut liked = false;
    for _ in 0..args.like {
        board.like();
        liked = true;
    }
    if args.toggle_theme {
        board.toggle_theme();
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&board.snapshot())?);
        return Ok(());
    }

    println!("{}  [{} theme]", board.formatted_date(), board.theme());
    println!();
    println!("Daily Affirmation");
    println!("  {}", board.affirmation());
    if liked {
        println!("  {}", board.streak_message());
    }
    println!();
    println!("Quote of the Day");
    println!("  \"{}\"", board.quote());
    println!();
    println!("Current Streak: {} days", board.streak());
    Ok(())
}
