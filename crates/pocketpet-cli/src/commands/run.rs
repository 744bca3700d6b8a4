//! Live session driven from the terminal.
//!
//! Events are written to stdout as JSON lines; acknowledgements and
//! errors go to stderr. Commands are read line by line from stdin:
//!
//! ```text
//! feed | shower | sleep | pause | accept | decline | dismiss | status | quit
//! admin <passphrase> victory | cut [secs] | preview <sprite> | restore
//!                    | wake | offer | launch [game]
//! ```

use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use pocketpet_core::{
    Config, Minigame, MinigameCatalog, MinigameError, MinigameOutcome, OfferResponse,
    OutcomeReporter, PetEngine,
};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::config::resolve;

#[derive(Args)]
pub struct RunArgs {
    /// Built-in profile to play
    #[arg(long, conflicts_with = "config")]
    pub profile: Option<String>,
    /// Config file to play instead of the default one
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Seed the session RNG for a reproducible run
    #[arg(long)]
    pub seed: Option<u64>,
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn Error>> {
    let mut config = resolve(args.profile.as_deref(), args.config.as_deref())?;
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(play(config));
    // Stdin is read on a blocking thread that may still be parked on a read.
    runtime.shutdown_background();
    result
}

async fn play(config: Config) -> Result<(), Box<dyn Error>> {
    let catalog = MinigameCatalog::new().with(CoinFlip);
    let (engine, mut events) = PetEngine::start(config, catalog)?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(event) => {
                    println!("{}", serde_json::to_string(&event)?);
                    if event.is_terminal() {
                        break;
                    }
                }
                None => break,
            },
            line = lines.next_line() => match line? {
                Some(line) => match execute(&engine, &line) {
                    Ok(Flow::Continue) => {}
                    Ok(Flow::Quit) => break,
                    Err(e) => eprintln!("error: {e}"),
                },
                None => break,
            },
        }
    }

    engine.shutdown();
    // Flush whatever was published before the loop stopped.
    while let Ok(event) = events.try_recv() {
        println!("{}", serde_json::to_string(&event)?);
    }
    Ok(())
}

enum Flow {
    Continue,
    Quit,
}

fn execute(engine: &PetEngine, line: &str) -> Result<Flow, Box<dyn Error>> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(Flow::Continue);
    };

    match command {
        "feed" => acknowledge("feed", engine.feed()),
        "shower" => acknowledge("shower", engine.shower()),
        "sleep" => {
            let sleeping = engine.toggle_sleep();
            eprintln!("{}", if sleeping { "asleep" } else { "awake" });
        }
        "pause" => {
            let paused = engine.toggle_pause()?;
            eprintln!("{}", if paused { "paused" } else { "resumed" });
        }
        "accept" => answer(engine, OfferResponse::Accepted),
        "decline" => answer(engine, OfferResponse::Declined),
        "dismiss" => answer(engine, OfferResponse::Dismissed),
        "status" => println!("{}", serde_json::to_string(&engine.snapshot())?),
        "admin" => {
            let passphrase = words.next().ok_or("usage: admin <passphrase> <op> [arg]")?;
            let op = words.next().ok_or("missing admin operation")?;
            admin(engine, passphrase, op, words.next())?;
        }
        "quit" | "exit" => return Ok(Flow::Quit),
        other => return Err(format!("unknown command '{other}'").into()),
    }
    Ok(Flow::Continue)
}

fn admin(
    engine: &PetEngine,
    passphrase: &str,
    op: &str,
    arg: Option<&str>,
) -> Result<(), Box<dyn Error>> {
    let console = engine.admin(passphrase)?;
    match op {
        "victory" => acknowledge("victory", console.force_victory()),
        "cut" => {
            let by = arg.map(str::parse::<u64>).transpose()?.map(Duration::from_secs);
            let remaining = console.cut_time(by);
            eprintln!("remaining: {}s", remaining.as_secs());
        }
        "preview" => {
            let key = arg.ok_or("usage: admin <passphrase> preview <sprite>")?;
            let sprite = console.preview_sprite(key)?;
            eprintln!("previewing {sprite}");
        }
        "restore" => console.restore_stats(),
        "wake" => acknowledge("wake", console.wake()),
        "offer" => {
            let id = console.force_offer()?;
            eprintln!("offer {id} open");
        }
        "launch" => console.launch_minigame(arg)?,
        other => return Err(format!("unknown admin operation '{other}'").into()),
    }
    Ok(())
}

fn answer(engine: &PetEngine, response: OfferResponse) {
    if !engine.respond(response) {
        eprintln!("no popup is open");
    }
}

fn acknowledge(what: &str, applied: bool) {
    if !applied {
        eprintln!("{what} ignored");
    }
}

/// Stand-in minigame: a coin toss settled a second after launch.
struct CoinFlip;

impl Minigame for CoinFlip {
    fn name(&self) -> &str {
        "coin-flip"
    }

    fn launch(&self, reporter: OutcomeReporter) -> Result<(), MinigameError> {
        let handle = tokio::runtime::Handle::try_current().map_err(|e| {
            MinigameError::LaunchFailed {
                game: self.name().to_string(),
                message: e.to_string(),
            }
        })?;

        let outcome = if rand::random::<bool>() {
            MinigameOutcome::Won
        } else {
            MinigameOutcome::Lost
        };
        handle.spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            reporter.report(outcome);
        });
        Ok(())
    }
}
