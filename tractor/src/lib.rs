//! Training and evaluation programs of the tractor agent.
//!
//! [`TractorConfig`] gathers the configuration of every component in one YAML
//! document. [`train`] and [`evaluate`] wire the WebSocket transport, the
//! candle model and the agent together; the `tractor-train` and
//! `tractor-eval` binaries are thin wrappers around them.
use anyhow::Result;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};
use tractor_candle_agent::{MlpModel, MlpModelConfig};
use tractor_core::{
    Agent, AgentConfig, ControllerConfig, EpisodeController, Evaluator, EvaluatorConfig,
    ReplayBuffer, ReplayBufferBase, ReplayBufferConfig, StopSignal, TractorAgent, Trainer, TrainerConfig,
};
use tractor_ws_env::{WsConfig, WsConnector};

/// Configuration of a training or evaluation run.
///
/// Missing sections take their default values.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Default)]
#[serde(default)]
pub struct TractorConfig {
    /// Connection to the simulator.
    pub ws: WsConfig,

    /// Experience replay.
    pub replay_buffer: ReplayBufferConfig,

    /// Action selection and targets.
    pub agent: AgentConfig,

    /// Cadence of the optimization steps.
    pub trainer: TrainerConfig,

    /// Episode lifecycle of training.
    pub controller: ControllerConfig,

    /// Evaluation runs.
    pub evaluator: EvaluatorConfig,

    /// Network and optimizer.
    pub model: MlpModelConfig,
}

impl TractorConfig {
    /// Constructs [`TractorConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`TractorConfig`] as YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }

    /// Loads the configuration file if given, the defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                info!("Loading configuration from {:?}", path);
                Self::load(path)
            }
            None => Ok(Self::default()),
        }
    }
}

/// Returns a [`StopSignal`] raised by Ctrl-C.
pub fn stop_on_interrupt() -> Result<StopSignal> {
    let stop = StopSignal::new();
    let handler_stop = stop.clone();
    ctrlc::set_handler(move || {
        warn!("Interrupted, finishing the run");
        handler_stop.stop();
    })?;
    Ok(stop)
}

/// Trains a fresh agent against the simulator.
///
/// The model and the metrics are saved at the end of the run, including a run
/// cut short by `stop`.
pub fn train(config: &TractorConfig, stop: StopSignal) -> Result<()> {
    let connector = WsConnector::build(config.ws.clone()).with_stop_signal(stop.clone());
    let model = MlpModel::build(config.model.clone())?;
    let mut agent = TractorAgent::build(config.agent.clone(), Some(model));
    let mut buffer = ReplayBuffer::build(&config.replay_buffer);
    let trainer = Trainer::build(config.trainer.clone());
    let mut controller = EpisodeController::build(config.controller.clone(), trainer, connector)
        .with_stop_signal(stop);

    controller.run(&mut agent, &mut buffer)?;
    Ok(())
}

/// Builds an agent in evaluation mode from the parameters at `model_path`.
///
/// Without loadable parameters the agent drives with its default heuristic.
pub fn eval_agent(config: &TractorConfig, model_path: &Path) -> Result<TractorAgent<MlpModel>> {
    let mut model = MlpModel::build(config.model.clone())?;
    let model = match tractor_core::QModel::load(&mut model, model_path) {
        Ok(()) => Some(model),
        Err(e) => {
            warn!(
                "Could not load the model from {:?} ({}), driving with the default heuristic",
                model_path, e
            );
            None
        }
    };
    let mut agent = TractorAgent::build(config.agent.clone(), model);
    Agent::<ReplayBuffer>::eval(&mut agent);
    Ok(agent)
}

/// Evaluates the parameters at `model_path` until the simulator disconnects
/// or the episode budget is spent.
pub fn evaluate(config: &TractorConfig, model_path: &Path, stop: StopSignal) -> Result<()> {
    let mut agent = eval_agent(config, model_path)?;
    let connector = WsConnector::build(config.ws.clone()).with_stop_signal(stop.clone());
    let mut evaluator =
        Evaluator::build(config.evaluator.clone(), connector).with_stop_signal(stop);

    evaluator.run(&mut agent)?;
    Ok(())
}
