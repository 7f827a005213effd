//! Memory Match entry point
//!
//! Native builds run a terminal front end; the web build exposes `WebGame`
//! from the library and only initialises logging here.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).expect("Failed to init logger");
    log::info!("Memory Match loaded");
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod terminal {
    use std::io::{self, BufRead, Write};
    use std::time::Duration;

    use memory_match::persistence::FileStore;
    use memory_match::session::Session;
    use memory_match::settings::Difficulty;
    use memory_match::sim::{CardStatus, Command, SoundEffect};

    const SAVE_FILE: &str = "memory_match.json";

    pub fn run() -> Result<(), Box<dyn std::error::Error>> {
        let path = std::env::var("MEMORY_MATCH_SAVE").unwrap_or_else(|_| SAVE_FILE.to_owned());
        let store = FileStore::open(&path)?;
        let mut session = Session::start(store, memory_match::platform::random_seed())?;

        if session.is_restored() {
            println!("Resuming saved board.");
        }
        print_help();
        draw(&session);

        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = line?;
            let mut words = line.split_whitespace();
            match words.next() {
                None => continue,
                Some("q" | "quit") => break,
                Some("n" | "new") => session.new_game()?,
                Some("d" | "difficulty") => {
                    match words.next().and_then(Difficulty::from_str) {
                        Some(difficulty) => {
                            let mut settings = session.settings().clone();
                            settings.apply_difficulty(difficulty);
                            session.apply_settings(settings)?;
                        }
                        None => println!("Difficulties: easy, normal, hard, expert, master"),
                    }
                }
                Some("h" | "help") => print_help(),
                Some(word) => match word.parse::<usize>() {
                    Ok(index) => play(&mut session, index),
                    Err(_) => println!("Unknown command: {word}"),
                },
            }
            draw(&session);
            if session.engine().is_finished() {
                println!("Type `new` to play again or `quit` to leave.");
            }
        }

        log::info!("Leaving, progress is in {}", path);
        Ok(())
    }

    fn play(session: &mut Session<FileStore>, index: usize) {
        let mut commands = session.flip(index);
        if commands.is_empty() {
            println!("Card {index} can't be flipped.");
            return;
        }
        loop {
            let mut wait = None;
            for command in &commands {
                if let Command::Flip(i) = command {
                    println!("Card {i} shows {}", session.cards()[*i].value);
                }
                narrate(command);
                if let Command::RevealDelay { seconds, .. } = command {
                    wait = Some(*seconds);
                }
            }
            match wait {
                Some(seconds) if session.engine().is_resolving() => {
                    std::thread::sleep(Duration::from_secs_f32(seconds));
                    commands = session.finish_reveal();
                }
                _ => break,
            }
        }
    }

    fn narrate(command: &Command) {
        match command {
            Command::ShowCombo(streak) => println!("Combo x{streak}!"),
            Command::PlaySound(SoundEffect::Mismatch) => println!("No match."),
            Command::PlaySound(SoundEffect::Match) => println!("Match!"),
            Command::GameOver { score, turns } => {
                println!("Board cleared! Score {score} in {turns} turns.")
            }
            _ => {}
        }
    }

    fn draw(session: &Session<FileStore>) {
        let engine = session.engine();
        let columns = engine.board().columns() as usize;
        let width = engine.cards().len().saturating_sub(1).to_string().len();

        for row in engine.cards().chunks(columns) {
            let line: Vec<String> = row
                .iter()
                .map(|card| match card.status {
                    CardStatus::FaceDown => format!("[{:>width$}]", card.index),
                    CardStatus::FaceUp => format!(" {:>width$} ", card.value),
                    CardStatus::Matched => format!(" {:>width$} ", "-"),
                })
                .collect();
            println!("{}", line.join(" "));
        }
        println!(
            "Score {}  Turns {}  Combo {}",
            engine.score(),
            engine.turns(),
            engine.combo()
        );
        let _ = io::stdout().flush();
    }

    fn print_help() {
        println!("Enter a card number to flip it.");
        println!("Commands: new, difficulty <easy|normal|hard|expert|master>, help, quit");
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Memory Match (native) starting...");

    if let Err(e) = terminal::run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
