pub mod config;
pub mod state;

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::bus::frame::{self, ControlMode, InputMode, PowerState};
use crate::bus::{BusFrame, BusTransport};
use crate::module::Module;
use crate::protocol::command::AxisCommand;
use crate::switch::LimitSwitch;

use config::{AxisConfig, ConfigKey};
use state::AxisState;

/// Controller for one ODrive-driven axis on the shared bus.
///
/// The axis translates text commands into mode/setpoint frame sequences,
/// folds incoming position telemetry into a switch-relative position, and
/// re-zeroes itself against the home switch: while the switch reads active,
/// every raw reading becomes the new zero offset, so positions reported and
/// commanded afterwards are relative to the switch.
pub struct OdriveAxis {
    name: String,
    base_id: u16,
    bus: Arc<dyn BusTransport>,
    home_switch: Option<Arc<dyn LimitSwitch>>,
    report_tx: mpsc::UnboundedSender<String>,
    config: AxisConfig,
    state: AxisState,
    position: f32,
    offset: f32,
    telemetry_rx: Option<mpsc::UnboundedReceiver<BusFrame>>,
}

impl OdriveAxis {
    /// Creates an axis with default configuration. `parameters` carries the
    /// base bus identifier as a base-16 string (optional `0x` prefix).
    pub fn new(
        name: impl Into<String>,
        home_switch: Option<Arc<dyn LimitSwitch>>,
        bus: Arc<dyn BusTransport>,
        parameters: &str,
        report_tx: mpsc::UnboundedSender<String>,
    ) -> Result<Self> {
        let base_id = parse_base_id(parameters)?;
        Ok(Self {
            name: name.into(),
            base_id,
            bus,
            home_switch,
            report_tx,
            config: AxisConfig::default(),
            state: AxisState::Stopped,
            position: 0.0,
            offset: 0.0,
            telemetry_rx: None,
        })
    }

    pub fn state(&self) -> AxisState {
        self.state
    }

    /// Last reported position, relative to the current zero offset.
    pub fn position(&self) -> f32 {
        self.position
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn config(&self) -> &AxisConfig {
        &self.config
    }

    /// True iff a home switch is wired and currently pressed. The switch is
    /// normally-closed, so pressed reads as level 0.
    pub fn is_home_active(&self) -> bool {
        matches!(&self.home_switch, Some(switch) if switch.level() == 0)
    }

    /// Folds one raw telemetry reading into the runtime state. While the
    /// home switch is active the raw value is captured as the new zero
    /// offset, which continuously re-zeroes the axis against the switch.
    /// Never changes the axis state.
    pub fn ingest_telemetry(&mut self, raw: f32) {
        if self.is_home_active() {
            self.offset = raw;
        }
        self.position = raw - self.offset;
    }

    pub fn configure(&mut self, key: ConfigKey, value: &str) {
        match key {
            ConfigKey::Output => self.config.output = value == "1",
            ConfigKey::MinPos => self.config.min_pos = crate::protocol::parse_float(value),
            ConfigKey::MaxPos => self.config.max_pos = crate::protocol::parse_float(value),
            ConfigKey::Tolerance => self.config.tolerance = crate::protocol::parse_float(value),
            ConfigKey::HomeSpeed => self.config.home_speed = crate::protocol::parse_float(value),
        }
        debug!("{}: set {:?} = {}", self.name, key, value);
    }

    /// Commands an absolute position move. The target is clamped to the
    /// configured range before the zero offset is re-added for the wire
    /// value, so the firmware always receives a raw position.
    pub async fn move_to(&mut self, target: f32) -> Result<()> {
        self.send_power(PowerState::ClosedLoopControl).await?;
        self.send_mode(ControlMode::Position, InputMode::TrapTraj)
            .await?;

        let clamped = target.min(self.config.max_pos).max(self.config.min_pos);
        self.send_setpoint(frame::SET_INPUT_POS, clamped + self.offset)
            .await?;
        self.state = AxisState::Moving;
        Ok(())
    }

    pub async fn speed(&mut self, velocity: f32) -> Result<()> {
        self.send_power(PowerState::ClosedLoopControl).await?;
        self.send_mode(ControlMode::Velocity, InputMode::VelRamp)
            .await?;
        self.send_setpoint(frame::SET_INPUT_VEL, velocity).await?;
        self.state = AxisState::Moving;
        Ok(())
    }

    pub async fn torque(&mut self, power: f32) -> Result<()> {
        self.send_power(PowerState::ClosedLoopControl).await?;
        self.send_mode(ControlMode::Torque, InputMode::Passthrough)
            .await?;
        self.send_setpoint(frame::SET_INPUT_TORQUE, power).await?;
        self.state = AxisState::Moving;
        Ok(())
    }

    /// Drives toward the home switch at the configured homing velocity. The
    /// tick's homing check stops the axis once the switch triggers.
    pub async fn home(&mut self) -> Result<()> {
        self.send_power(PowerState::ClosedLoopControl).await?;
        self.send_mode(ControlMode::Velocity, InputMode::Passthrough)
            .await?;
        self.send_setpoint(frame::SET_INPUT_VEL, self.config.home_speed)
            .await?;
        self.state = AxisState::Homing;
        Ok(())
    }

    /// Drops the motor to idle. The resulting state depends only on the
    /// current switch reading, so repeated stops are idempotent.
    pub async fn halt(&mut self) -> Result<()> {
        self.send_power(PowerState::Idle).await?;
        self.state = if self.is_home_active() {
            AxisState::AtHome
        } else {
            AxisState::Stopped
        };
        Ok(())
    }

    async fn send_power(&self, state: PowerState) -> Result<()> {
        self.bus
            .send(BusFrame::data(
                self.base_id + frame::SET_AXIS_STATE,
                frame::power_state(state),
            ))
            .await
    }

    async fn send_mode(&self, control: ControlMode, input: InputMode) -> Result<()> {
        self.bus
            .send(BusFrame::data(
                self.base_id + frame::SET_CONTROLLER_MODE,
                frame::controller_mode(control, input),
            ))
            .await
    }

    async fn send_setpoint(&self, offset: u16, value: f32) -> Result<()> {
        self.bus
            .send(BusFrame::data(
                self.base_id + offset,
                frame::setpoint(value),
            ))
            .await
    }

    fn report(&self, line: String) {
        // Nobody listening is fine; reports are best-effort.
        let _ = self.report_tx.send(line);
    }

    fn status_line(&self) -> String {
        format!("{} {} {:.3}", self.name, self.state.code(), self.position)
    }

    fn drain_telemetry(&mut self) {
        let Some(rx) = self.telemetry_rx.as_mut() else {
            return;
        };
        let mut readings = Vec::new();
        while let Ok(received) = rx.try_recv() {
            // Remote frames on this id are our own telemetry requests.
            if !received.remote {
                readings.push(frame::read_position(&received.data));
            }
        }
        for raw in readings {
            self.ingest_telemetry(raw);
        }
    }
}

#[async_trait::async_trait]
impl Module for OdriveAxis {
    fn name(&self) -> &str {
        &self.name
    }

    async fn setup(&mut self) -> Result<()> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.bus
            .subscribe(self.base_id + frame::ENCODER_ESTIMATES, tx)
            .await;
        self.telemetry_rx = Some(rx);
        debug!("{}: subscribed at base id {:#05x}", self.name, self.base_id);
        Ok(())
    }

    async fn tick(&mut self) -> Result<()> {
        self.drain_telemetry();

        if self.config.output {
            self.report(self.status_line());
        }

        self.bus
            .send(BusFrame::remote(self.base_id + frame::ENCODER_ESTIMATES))
            .await?;

        if self.state == AxisState::Homing && self.is_home_active() {
            debug!("{}: home switch triggered, stopping", self.name);
            self.halt().await?;
        }
        Ok(())
    }

    async fn handle_command(&mut self, line: &str) -> Result<()> {
        match AxisCommand::parse(line) {
            Ok(AxisCommand::Move(target)) => self.move_to(target).await?,
            Ok(AxisCommand::Speed(velocity)) => self.speed(velocity).await?,
            Ok(AxisCommand::Torque(power)) => self.torque(power).await?,
            Ok(AxisCommand::Home) => self.home().await?,
            Ok(AxisCommand::Stop) => self.halt().await?,
            Ok(AxisCommand::Get) => {
                self.report(format!(
                    "{} get {} {:.3}",
                    self.name,
                    self.state.code(),
                    self.position
                ));
            }
            Ok(AxisCommand::Set { key, value }) => self.configure(key, &value),
            Err(e) => {
                warn!("{}: {}", self.name, e);
                self.report(e.to_string());
            }
        }
        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        self.halt().await
    }
}

fn parse_base_id(parameters: &str) -> Result<u16> {
    let text = parameters.trim();
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    u16::from_str_radix(digits, 16)
        .with_context(|| format!("invalid base bus identifier: {:?}", parameters))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_base_id() {
        assert_eq!(parse_base_id("10").unwrap(), 0x10);
        assert_eq!(parse_base_id("0x10").unwrap(), 0x10);
        assert_eq!(parse_base_id(" 1a ").unwrap(), 0x1a);
        assert!(parse_base_id("xyz").is_err());
        assert!(parse_base_id("").is_err());
    }
}
