use std::collections::VecDeque;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context};
use chrono::Utc;
use dataknow_core::{update, AppState, AppViewModel, JobStatus, Msg};
use dataknow_engine::{
    ensure_output_dir, AnalysisService, EngineConfig, ReqwestAnalysisService,
    SimulatedAnalysisService,
};
use dataknow_logging::{dk_info, dk_warn};

use super::autopilot::Autopilot;
use super::cli::Cli;
use super::config::{self, Settings};
use super::effects::EffectRunner;
use super::intake::candidates_from_paths;
use super::logging;
use super::render::Renderer;

const TICK_INTERVAL: Duration = Duration::from_millis(75);

pub fn run_app(cli: Cli) -> anyhow::Result<()> {
    logging::initialize(cli.log, logging::level_for(cli.verbose));

    let settings = Settings::resolve(config::load(&cli.config)?, &cli);
    let candidates = candidates_from_paths(&cli.files)?;
    ensure_output_dir(&settings.output_dir).with_context(|| {
        format!("preparing output directory {}", settings.output_dir.display())
    })?;

    let service: Arc<dyn AnalysisService> = match &settings.endpoint {
        Some(endpoint) => {
            dk_info!("Using analysis service at {}", endpoint);
            Arc::new(ReqwestAnalysisService::new(settings.service.clone())?)
        }
        None => {
            dk_info!("No endpoint configured, using the simulated analysis service");
            Arc::new(SimulatedAnalysisService::new(settings.simulation))
        }
    };

    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let runner = EffectRunner::new(
        EngineConfig {
            service,
            output_dir: settings.output_dir.clone(),
        },
        msg_tx.clone(),
    );

    // Background tick to coalesce rendering.
    thread::spawn(move || {
        while msg_tx.send(Msg::Tick).is_ok() {
            thread::sleep(TICK_INTERVAL);
        }
    });

    let mut session = Session {
        state: AppState::with_settings(settings.timings, settings.language),
        runner,
        autopilot: Autopilot::new(settings.prompt.clone()),
        renderer: Renderer::default(),
    };
    session.dispatch(Msg::FilesReceived {
        files: candidates,
        received_at: Utc::now(),
    });
    while !session.state.is_closed() {
        let Ok(msg) = msg_rx.recv() else {
            break;
        };
        session.dispatch(msg);
    }
    if !session.autopilot.is_done() {
        dk_warn!("Message channel closed before the session finished");
    }

    session.outcome()
}

struct Session {
    state: AppState,
    runner: EffectRunner,
    autopilot: Autopilot,
    renderer: Renderer,
}

impl Session {
    /// Runs `msg` and every follow-up action through the reducer, one at a time.
    fn dispatch(&mut self, msg: Msg) {
        let mut inbox = VecDeque::from([msg]);
        while let Some(msg) = inbox.pop_front() {
            let state = std::mem::take(&mut self.state);
            let (mut state, effects) = update(state, msg);
            let was_dirty = state.consume_dirty();
            let view = was_dirty.then(|| state.view());
            self.state = state;
            self.runner.enqueue(effects);

            if let Some(view) = view {
                self.present(&view);
                inbox.extend(self.autopilot.next(&view));
            }
        }
    }

    fn present(&mut self, view: &AppViewModel) {
        if let Some(lines) = self.renderer.frame(view) {
            println!("{}", lines.join("\n"));
            println!();
        }
    }

    fn outcome(&self) -> anyhow::Result<()> {
        match self.state.job() {
            Some(job) if job.status() == JobStatus::Error => {
                let reason = job.failure().unwrap_or("unknown error");
                dk_warn!("Session ended with a failed analysis: {}", reason);
                bail!("analysis failed: {reason}")
            }
            Some(_) => Ok(()),
            None if self.state.registry().is_empty() => bail!("no document was accepted"),
            None => Ok(()),
        }
    }
}
