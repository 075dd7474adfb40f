use anyhow::Result;
use serde_json::Value;
use std::{
    net::{TcpListener, TcpStream},
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};
use tempdir::TempDir;
use test_log::test;
use tractor_core::{
    dummy::{state_message, CountingModel},
    error::{ChannelError, ControllerError},
    AgentConfig, Channel, Connector, ControllerConfig, EpisodeController, Evaluator,
    EvaluatorConfig, ReconnectPolicy, ReplayBuffer, ReplayBufferBase, ReplayBufferConfig,
    StopSignal, TractorAgent, Trainer, TrainerConfig,
};
use tractor_ws_env::{WsConfig, WsConnector};
use tungstenite::{accept, Message, WebSocket};

const ZERO: [f32; 7] = [0.0; 7];

/// Binds a local server and runs `session` on every accepted connection, up to `n`.
fn serve<F>(n: usize, session: F) -> (String, JoinHandle<()>)
where
    F: Fn(usize, WebSocket<TcpStream>) + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());
    let handle = thread::spawn(move || {
        for i in 0..n {
            let (stream, _) = listener.accept().unwrap();
            session(i, accept(stream).unwrap());
        }
    });
    (url, handle)
}

fn read_text(ws: &mut WebSocket<TcpStream>) -> Option<String> {
    loop {
        match ws.read() {
            Ok(Message::Text(text)) => return Some(text),
            Ok(_) => continue,
            Err(_) => return None,
        }
    }
}

fn connector(url: &str) -> WsConnector {
    WsConnector::build(
        WsConfig::default()
            .url(url)
            .poll_interval_millis(20)
            .close_timeout_millis(200),
    )
}

#[test]
fn exchanges_messages_and_reports_close() -> Result<()> {
    let (url, server) = serve(1, |_, mut ws| {
        ws.send(Message::Text(state_message(ZERO, None, false, None)))
            .unwrap();
        let action = read_text(&mut ws).unwrap();
        ws.send(Message::Text(action)).unwrap();
        ws.send(Message::Ping(vec![1, 2, 3])).unwrap();
        ws.send(Message::Binary(b"{\"k\":1}".to_vec())).unwrap();
        ws.close(None).unwrap();
        while ws.read().is_ok() {}
    });

    let mut channel = connector(&url).connect()?;
    let first: Value = serde_json::from_str(&channel.receive()?)?;
    assert_eq!(first["done"], Value::Bool(false));

    channel.send(r#"{"acceleration":0.5}"#)?;
    assert_eq!(channel.receive()?, r#"{"acceleration":0.5}"#);
    assert_eq!(channel.receive()?, r#"{"k":1}"#);
    assert!(matches!(channel.receive(), Err(ChannelError::Closed)));
    channel.close();

    server.join().unwrap();
    Ok(())
}

#[test]
fn connect_failure_is_reported() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let result = connector(&format!("ws://127.0.0.1:{}", port)).connect();
    assert!(matches!(result, Err(ChannelError::Connect(_))));
}

#[test]
fn stop_signal_cancels_a_pending_receive() -> Result<()> {
    let (url, server) = serve(1, |_, mut ws| {
        // Silent peer: wait until the client goes away.
        while ws.read().is_ok() {}
    });

    let stop = StopSignal::new();
    let mut channel = connector(&url).with_stop_signal(stop.clone()).connect()?;
    let stopper = {
        let stop = stop.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(100));
            stop.stop();
        })
    };

    let start = Instant::now();
    assert!(matches!(channel.receive(), Err(ChannelError::Cancelled)));
    assert!(start.elapsed() < Duration::from_secs(5));
    channel.close();

    stopper.join().unwrap();
    server.join().unwrap();
    Ok(())
}

#[test]
fn trains_an_episode_over_websocket_after_a_dropped_connection() -> Result<()> {
    let (url, server) = serve(2, |i, mut ws| {
        ws.send(Message::Text(state_message(ZERO, None, false, None)))
            .unwrap();
        if i == 0 {
            // Drop the first connection in the middle of the episode.
            let _ = read_text(&mut ws);
            return;
        }
        for step in 1..=3 {
            if read_text(&mut ws).is_none() {
                return;
            }
            let msg = state_message(ZERO, Some(1.0), step == 3, Some(step as f32 * 10.0));
            ws.send(Message::Text(msg)).unwrap();
        }
        while ws.read().is_ok() {}
    });

    let dir = TempDir::new("ws_training")?;
    let config = ControllerConfig::default()
        .max_episodes(1)
        .reconnect(ReconnectPolicy::default().backoff_millis(10))
        .model_path(dir.path().join("model.json"))
        .metrics_path(None);
    let mut ctrl = EpisodeController::build(
        config,
        Trainer::build(TrainerConfig::default()),
        connector(&url),
    );
    let mut agent = TractorAgent::build(
        AgentConfig::default(),
        Some(CountingModel::constant([0.5, 0.0, 0.0])),
    );
    let mut buffer = ReplayBuffer::build(&ReplayBufferConfig::default());

    ctrl.run(&mut agent, &mut buffer)?;

    assert_eq!(ctrl.stats().reconnects, 1);
    let summary = &ctrl.metrics().history()[0];
    assert_eq!(summary.step_count, 3);
    assert_eq!(summary.total_reward, 3.0);
    assert_eq!(summary.max_progress, 30.0);

    server.join().unwrap();
    Ok(())
}

#[test]
fn evaluation_ends_when_the_simulator_is_absent() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let mut evaluator = Evaluator::build(
        EvaluatorConfig::default(),
        connector(&format!("ws://127.0.0.1:{}", port)),
    );
    let mut agent: TractorAgent<CountingModel> = TractorAgent::build(AgentConfig::default(), None);

    let result = evaluator.run(&mut agent);

    assert!(matches!(
        result,
        Err(ControllerError::Transport(ChannelError::Connect(_)))
    ));
}
