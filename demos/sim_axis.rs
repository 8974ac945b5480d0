//! Runs one axis against a simulated motor controller on a loopback bus.
//!
//! Connect with `socat - UNIX-CONNECT:/tmp/odaxis.sock` and try:
//!
//! ```text
//! x set output 1
//! x home
//! x move 25
//! x get
//! x stop
//! ```

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use tokio::sync::{broadcast, mpsc};
use tracing::info;

use odaxis::axis::OdriveAxis;
use odaxis::bus::frame::{self, PowerState};
use odaxis::bus::loopback::LoopbackBus;
use odaxis::bus::{BusFrame, BusTransport};
use odaxis::console::config::ConsoleConfig;
use odaxis::console::Console;
use odaxis::registry::config::RegistryConfig;
use odaxis::registry::ModuleRegistry;
use odaxis::switch::LimitSwitch;

/// Shared state of the simulated motor: raw encoder position and the
/// velocity currently commanded.
#[derive(Default)]
struct SimMotor {
    raw_pos: f32,
    velocity: f32,
}

/// Home switch of the simulated rig: pressed (level 0) while the axis sits
/// at or below raw position zero.
struct SimSwitch {
    motor: Arc<Mutex<SimMotor>>,
}

impl LimitSwitch for SimSwitch {
    fn level(&self) -> u8 {
        let motor = self.motor.lock().unwrap();
        if motor.raw_pos <= 0.0 {
            0
        } else {
            1
        }
    }
}

/// Minimal stand-in for the ODrive firmware: integrates velocity, jumps to
/// commanded positions, answers telemetry requests.
async fn run_sim_firmware(bus: Arc<LoopbackBus>, base_id: u16, motor: Arc<Mutex<SimMotor>>) {
    let (tx, mut rx) = mpsc::unbounded_channel();
    for offset in [
        frame::SET_AXIS_STATE,
        frame::ENCODER_ESTIMATES,
        frame::SET_INPUT_POS,
        frame::SET_INPUT_VEL,
        frame::SET_INPUT_TORQUE,
    ] {
        bus.subscribe(base_id + offset, tx.clone()).await;
    }

    let mut ticker = tokio::time::interval(Duration::from_millis(10));
    loop {
        tokio::select! {
            Some(received) = rx.recv() => {
                let offset = received.id - base_id;
                match offset {
                    frame::ENCODER_ESTIMATES if received.remote => {
                        let raw = motor.lock().unwrap().raw_pos;
                        let _ = bus
                            .send(BusFrame::data(base_id + frame::ENCODER_ESTIMATES, frame::setpoint(raw)))
                            .await;
                    }
                    frame::SET_AXIS_STATE => {
                        if received.data[0] == PowerState::Idle as u8 {
                            motor.lock().unwrap().velocity = 0.0;
                        }
                    }
                    frame::SET_INPUT_POS => {
                        let mut m = motor.lock().unwrap();
                        m.raw_pos = frame::read_position(&received.data);
                        m.velocity = 0.0;
                    }
                    frame::SET_INPUT_VEL => {
                        motor.lock().unwrap().velocity = frame::read_position(&received.data);
                    }
                    _ => {}
                }
            }
            _ = ticker.tick() => {
                let mut m = motor.lock().unwrap();
                m.raw_pos += m.velocity * 0.01;
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let deployment = RegistryConfig::from_json(
        r#"{
            "tick_interval_ms": 100,
            "axes": [{"name": "x", "node_id": "0x10", "home_switch": true}]
        }"#,
    )?;

    let bus = Arc::new(LoopbackBus::new());
    let registry = Arc::new(ModuleRegistry::new());
    let (reports, _) = broadcast::channel(64);

    // Bridge module report lines into the console broadcast.
    let (report_tx, mut report_rx) = mpsc::unbounded_channel();
    let report_fanout = reports.clone();
    tokio::spawn(async move {
        while let Some(line) = report_rx.recv().await {
            let _ = report_fanout.send(line);
        }
    });

    for decl in &deployment.axes {
        let motor = Arc::new(Mutex::new(SimMotor::default()));
        let switch = decl.home_switch.then(|| {
            Arc::new(SimSwitch {
                motor: motor.clone(),
            }) as Arc<dyn LimitSwitch>
        });

        let axis = OdriveAxis::new(
            decl.name.clone(),
            switch,
            bus.clone(),
            &decl.node_id,
            report_tx.clone(),
        )?;
        let base_id = u16::from_str_radix(decl.node_id.trim_start_matches("0x"), 16)?;
        tokio::spawn(run_sim_firmware(bus.clone(), base_id, motor));
        registry.register(Box::new(axis)).await?;
    }

    let tick_loop = registry
        .clone()
        .run(Duration::from_millis(deployment.tick_interval_ms));

    let mut console = Console::new(ConsoleConfig::default(), registry.clone(), reports);
    console.start().await?;

    info!("Simulation running, press Ctrl-C to stop");
    tokio::signal::ctrl_c().await?;

    tick_loop.abort();
    registry.stop_all().await;
    console.shutdown().await?;
    Ok(())
}
