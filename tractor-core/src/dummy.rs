//! Scripted transports and a counting model, used for tests.
use crate::{error::ChannelError, ActionValues, Channel, Connector, Observation, QModel};
use anyhow::{anyhow, Result};
use serde_json::json;
use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    fs,
    path::Path,
    rc::Rc,
};

/// Builds a state message as the simulator sends it.
pub fn state_message(obs: [f32; 7], reward: Option<f32>, done: bool, progress: Option<f32>) -> String {
    let mut msg = json!({ "observation": obs, "done": done });
    if let Some(r) = reward {
        msg["reward"] = json!(r);
    }
    if let Some(p) = progress {
        msg["info"] = json!({ "progress": p });
    }
    msg.to_string()
}

/// A channel replaying a fixed list of incoming events.
///
/// Once the script is exhausted, [`Channel::receive`] reports
/// [`ChannelError::Closed`].
pub struct ScriptedChannel {
    incoming: VecDeque<Result<String, ChannelError>>,
    sent: Rc<RefCell<Vec<String>>>,
    closed: Rc<Cell<usize>>,
}

impl Channel for ScriptedChannel {
    fn send(&mut self, message: &str) -> Result<(), ChannelError> {
        self.sent.borrow_mut().push(message.to_string());
        Ok(())
    }

    fn receive(&mut self) -> Result<String, ChannelError> {
        self.incoming.pop_front().unwrap_or(Err(ChannelError::Closed))
    }

    fn close(&mut self) {
        self.closed.set(self.closed.get() + 1);
    }
}

/// A connector handing out scripted sessions in order.
///
/// Each call to [`Connector::connect`] consumes the next scripted attempt,
/// which is either a connection failure or a [`ScriptedChannel`]. Connecting
/// after the script is exhausted fails.
#[derive(Default)]
pub struct ScriptedConnector {
    attempts: VecDeque<Result<Vec<Result<String, ChannelError>>, ChannelError>>,
    sent: Rc<RefCell<Vec<String>>>,
    connects: Rc<Cell<usize>>,
    closed: Rc<Cell<usize>>,
}

impl ScriptedConnector {
    /// Creates a connector with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a failing connection attempt.
    pub fn fail(mut self, err: ChannelError) -> Self {
        self.attempts.push_back(Err(err));
        self
    }

    /// Appends a session delivering `messages` and then closing.
    pub fn session<S: Into<String>>(mut self, messages: impl IntoIterator<Item = S>) -> Self {
        self.attempts
            .push_back(Ok(messages.into_iter().map(|m| Ok(m.into())).collect()));
        self
    }

    /// Appends a session with arbitrary incoming events.
    pub fn session_with(mut self, events: Vec<Result<String, ChannelError>>) -> Self {
        self.attempts.push_back(Ok(events));
        self
    }

    /// Messages sent over all sessions so far.
    pub fn sent(&self) -> Rc<RefCell<Vec<String>>> {
        self.sent.clone()
    }

    /// Number of connection attempts so far, successful or not.
    pub fn connects(&self) -> Rc<Cell<usize>> {
        self.connects.clone()
    }

    /// Number of channels closed by the client.
    pub fn closed(&self) -> Rc<Cell<usize>> {
        self.closed.clone()
    }
}

impl Connector for ScriptedConnector {
    type Channel = ScriptedChannel;

    fn connect(&mut self) -> Result<Self::Channel, ChannelError> {
        self.connects.set(self.connects.get() + 1);
        match self.attempts.pop_front() {
            Some(Ok(incoming)) => Ok(ScriptedChannel {
                incoming: incoming.into(),
                sent: self.sent.clone(),
                closed: self.closed.clone(),
            }),
            Some(Err(e)) => Err(e),
            None => Err(ChannelError::Connect("script exhausted".to_string())),
        }
    }
}

/// A model with a constant output that counts its updates.
#[derive(Debug, Clone)]
pub struct CountingModel {
    output: Option<ActionValues>,
    fits: Rc<Cell<usize>>,
    last_fit_len: Option<usize>,
}

impl CountingModel {
    /// A model predicting `output` for every observation.
    pub fn constant(output: ActionValues) -> Self {
        Self {
            output: Some(output),
            fits: Rc::new(Cell::new(0)),
            last_fit_len: None,
        }
    }

    /// A model whose predictions and updates always fail.
    pub fn failing() -> Self {
        Self {
            output: None,
            fits: Rc::new(Cell::new(0)),
            last_fit_len: None,
        }
    }

    /// Shared counter of calls to [`QModel::fit`].
    pub fn fit_counter(&self) -> Rc<Cell<usize>> {
        self.fits.clone()
    }

    /// Batch size of the most recent update.
    pub fn last_fit_len(&self) -> Option<usize> {
        self.last_fit_len
    }
}

impl QModel for CountingModel {
    fn predict(&self, _obs: &Observation) -> Result<ActionValues> {
        self.output.ok_or_else(|| anyhow!("inference failed"))
    }

    fn fit(&mut self, states: &[Observation], targets: &[ActionValues]) -> Result<f32> {
        let output = self.output.ok_or_else(|| anyhow!("update failed"))?;
        self.fits.set(self.fits.get() + 1);
        self.last_fit_len = Some(states.len());
        let n = (targets.len() * 3).max(1) as f32;
        let loss = targets
            .iter()
            .flat_map(|t| t.iter().zip(output.iter()).map(|(t, o)| (t - o) * (t - o)))
            .sum::<f32>()
            / n;
        Ok(loss)
    }

    fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, serde_json::to_string(&self.output)?)?;
        Ok(())
    }

    fn load(&mut self, path: &Path) -> Result<()> {
        self.output = serde_json::from_str(&fs::read_to_string(path)?)?;
        Ok(())
    }
}
