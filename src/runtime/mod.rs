use std::env;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::mpsc;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::app::App;
use crate::audio::RodioBackend;
use crate::engine::{
    EngineSettings, MediaEvent, MemoryPreferencesStore, PlaybackEngine, PreferencesStore,
    TomlPreferencesStore,
};
use crate::library::{LibrarySource, TrackSource};

mod event_loop;
mod logging;
mod settings;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, settings_warning) = settings::load_settings();
    logging::init(&settings.logging)?;
    if let Some(msg) = settings_warning {
        warn!("{msg}");
    }

    let dir = env::args()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("Music"));

    let source = Rc::new(LibrarySource::scan(&dir, &settings.library));
    let library = source.list_tracks()?;

    let store: Box<dyn PreferencesStore> = match settings.preferences_path() {
        Some(path) => {
            info!(path = %path.display(), "using preferences file");
            Box::new(TomlPreferencesStore::new(path))
        }
        None => {
            warn!("no preferences location, volume and modes will not persist");
            Box::new(MemoryPreferencesStore::default())
        }
    };

    let (media_tx, media_rx) = mpsc::channel::<MediaEvent>();
    let media = RodioBackend::open(media_tx)?;

    let mut engine = PlaybackEngine::new(
        Box::new(media),
        source.clone(),
        store,
        EngineSettings::from(&settings.playback),
    );
    let snapshots = engine.subscribe();

    let mut app = App::new(library);
    app.apply_snapshot(engine.snapshot());
    if source.is_empty() {
        app.set_message(format!("No audio files under {}", source.root().display()));
    }

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result: Result<(), Box<dyn std::error::Error>> = (|| {
        let mut state = event_loop::EventLoopState::default();
        let mut cx = event_loop::Context {
            settings: &settings,
            app: &mut app,
            engine: &mut engine,
            source: source.as_ref(),
        };
        event_loop::run(&mut terminal, &mut cx, &media_rx, &snapshots, &mut state)
    })();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}
