//! TaskaDeck: a desktop shell that keeps one live webview per destination.
//!
//! Entry point: opens the main window with the sidebar and content surfaces.
//! When built without the `gui` feature, runs a console shell on headless
//! surfaces that reads boundary messages as JSON lines from stdin.

fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

#[cfg(feature = "gui")]
fn main() {
    init_logging();
    if let Err(e) = taskadeck::ui::webview_app::run() {
        log::error!("TaskaDeck failed to start: {}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "gui"))]
fn main() {
    init_logging();
    if let Err(e) = console::run() {
        log::error!("TaskaDeck console failed: {}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "gui"))]
mod console {
    use std::error::Error;
    use std::io::BufRead;
    use std::sync::mpsc;

    use taskadeck::app::App;
    use taskadeck::headless::{HeadlessFactory, HeadlessProbe};
    use taskadeck::platform;
    use taskadeck::services::session_store::SessionStore;
    use taskadeck::services::settings_engine::SettingsEngine;
    use taskadeck::services::url_resolver::UrlResolver;

    pub fn run() -> Result<(), Box<dyn Error>> {
        let settings = SettingsEngine::new(None).load_or_default();
        let runtime = tokio::runtime::Runtime::new()?;
        let session = SessionStore::init(
            &settings.session.partition,
            &platform::get_data_dir(),
            runtime.handle().clone(),
        )?;

        let factory = HeadlessFactory::auto_completing();
        let probe = factory.probe();
        let mut app = App::new(factory, settings, session, UrlResolver::from_install_layout());

        let (flush_tx, flush_rx) = mpsc::channel();
        app.start_periodic_flush(Box::new(move || {
            let _ = flush_tx.send(());
        }));

        app.startup()?;
        pump(&mut app, &probe);
        report(&app);

        for line in std::io::stdin().lock().lines() {
            let line = line?;
            while flush_rx.try_recv().is_ok() {
                app.flush_session();
            }
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Err(e) = app.handle_boundary(line) {
                log::warn!("Rejected boundary message: {}", e);
                continue;
            }
            pump(&mut app, &probe);
            report(&app);
        }

        app.shutdown();
        Ok(())
    }

    /// Feeds queued navigation events back until the surfaces go quiet.
    fn pump(app: &mut App<HeadlessFactory>, probe: &HeadlessProbe) {
        loop {
            let events = probe.drain_events();
            if events.is_empty() {
                break;
            }
            for event in &events {
                app.handle_navigation(event);
            }
        }
    }

    fn report(app: &App<HeadlessFactory>) {
        let controller = &app.controller;
        let attached = controller.attached();
        let bounds = controller.layout().bounds();
        let status = serde_json::json!({
            "attached": attached.map(|id| id.to_string()),
            "url": attached
                .and_then(|id| controller.registry().get(id))
                .map(|s| s.key().to_string()),
            "sidebar_open": controller.layout().sidebar_open(),
            "bounds": {
                "x": bounds.x,
                "y": bounds.y,
                "width": bounds.width,
                "height": bounds.height,
            },
            "surfaces": controller.registry().len(),
        });
        println!("{}", status);
    }
}
