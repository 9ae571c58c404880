use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pinchkey::autocomplete::{Suggester, Vocabulary};
use pinchkey::charmodel::{self, CharPredictor, TrainProgress};
use pinchkey::config::{Config, SuggestEngine};
use pinchkey::keyboard::{
    ClickCue, JsonLinesSource, LandmarkSource, Overlay, OverlayState, Session, create_injector,
};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pinchkey", about = "Pinch-operated virtual keyboard with autocomplete")]
struct Cli {
    /// Configuration file
    #[arg(long, global = true, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Clone, Copy, PartialEq)]
enum Command {
    /// Run the gesture keyboard (default)
    Keyboard,
    /// Train the next-character model on the corpus
    Train,
    /// Predict the next character for one line of text
    Predict,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Keyboard);

    // The overlay owns the terminal, so keep the log quiet there
    let default_level = if command == Command::Keyboard {
        "warn"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();

    let config = Config::load_from(&cli.config);

    match command {
        Command::Keyboard => run_keyboard(&config),
        Command::Train => run_train(&config),
        Command::Predict => run_predict(&config),
    }
}

fn run_train(config: &Config) -> Result<()> {
    let corpus = Path::new(&config.corpus_path);
    let words = charmodel::read_corpus_words(corpus)?;
    println!("Read {} words from {}", words.len(), corpus.display());

    let epochs = config.model.epochs;
    let trained =
        charmodel::train::train_with_progress(&words, &config.model, |progress| match progress {
            TrainProgress::Started { model, maxlen } => print!("{}", model.summary(maxlen)),
            TrainProgress::Epoch(stats) => println!(
                "Epoch {}/{} - loss: {:.4} - accuracy: {:.4}",
                stats.epoch, epochs, stats.loss, stats.accuracy
            ),
        })?;
    trained.save(Path::new(&config.model.dir))?;
    println!("Training complete.");
    Ok(())
}

fn run_predict(config: &Config) -> Result<()> {
    let predictor = CharPredictor::load(Path::new(&config.model.dir))
        .with_context(|| format!("loading char model from {}", config.model.dir))?;

    print!("Enter partial text: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let text = line.trim_end_matches(['\r', '\n']);

    let next = predictor.predict_next_char(text).map(String::from).unwrap_or_default();
    println!("Suggested next character: '{}'", next);
    Ok(())
}

fn build_suggester(config: &Config) -> Result<Box<dyn Suggester>> {
    Ok(match config.keyboard.engine {
        SuggestEngine::Vocabulary => {
            let path = Path::new(&config.corpus_path);
            let vocab = Vocabulary::load(path, &config.vocabulary)
                .with_context(|| format!("reading corpus {}", path.display()))?;
            Box::new(vocab)
        }
        SuggestEngine::CharModel => {
            let predictor = CharPredictor::load(Path::new(&config.model.dir))
                .with_context(|| format!("loading char model from {}", config.model.dir))?;
            Box::new(predictor)
        }
    })
}

fn run_keyboard(config: &Config) -> Result<()> {
    let kb = &config.keyboard;
    let suggester = build_suggester(config)?;
    let mut source = JsonLinesSource::open(&kb.landmarks)?;
    let mut injector = create_injector(kb.inject, &kb.input_method)?;
    let cue = ClickCue::from_config(&config.feedback)?;

    let mut session = Session::new(kb, suggester);
    let mut overlay = Overlay::new(kb.quit_key).context("terminal overlay unavailable")?;
    let started = Instant::now();

    while !overlay.poll_quit()? {
        let Some(landmarks) = source.next_frame()? else {
            tracing::info!("landmark stream ended");
            break;
        };
        let update = session.update(&landmarks, started.elapsed());

        if update.event.is_some() {
            cue.click();
        }
        injector.send_all(&update.keystrokes)?;

        overlay.draw(
            session.layout(),
            &OverlayState {
                hovered: update.hovered,
                pinch_distance: update.pinch_distance,
                text: session.text(),
                suggestion: session.suggestion(),
            },
        )?;
    }

    overlay.restore()?;
    println!("{}", session.text());
    Ok(())
}
