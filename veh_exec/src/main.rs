//! Main vehicle control executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Spawn the speed control task
//!     - Main loop (one iteration per control cycle):
//!         - Bus frame draining and dispatch
//!         - Remote controller input acquisition
//!         - Calibration application to the steering mappers
//!         - Safety verdict evaluation
//!         - Mode control processing
//!         - Actuator output and shared state publication
//!
//! The speed control task runs concurrently at its own faster fixed period,
//! reading the ramp and gains published here and writing the speed and
//! distance estimates read here. Every shared field has a single writing
//! context, see `veh_lib::shared`.

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use veh_lib::{
    data_store::DataStore,
    params::VehExecParams,
    safety::SafetyMonitor,
    shared::SharedState,
    sim, speed_ctrl,
    steer_ctrl::{self, SteeringMapper},
};

mod bus_dispatch;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{info, warn};
use std::sync::atomic::AtomicBool;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

// Internal
use bus_if::link::{BusLink, ChannelBusLink};
use bus_if::remote::RemoteCommand;
use util::{
    logger::{logger_init, LevelFilter},
    module::State,
    session::{self, Session},
};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("veh_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Vehicle Control Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let exec_params: VehExecParams =
        util::params::load("veh_exec.toml").wrap_err("Could not load exec params")?;

    let speed_ctrl_params: speed_ctrl::Params =
        util::params::load("speed_ctrl.toml").wrap_err("Could not load SpeedCtrl params")?;

    info!("Exec parameters loaded");

    // ---- INITIALISE DATASTORE ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();

    // ---- INITIALISE MODULES ----

    ds.mode_ctrl
        .init("mode_ctrl.toml", &session)
        .wrap_err("Failed to initialise ModeCtrl")?;
    info!("ModeCtrl init complete");

    let mut safety_monitor =
        SafetyMonitor::new(Duration::from_secs_f64(exec_params.remote_timeout_s));

    info!("Module initialisation complete\n");

    // ---- INITIALISE EQUIPMENT ----

    // The hardware transceiver, remote receiver decoder and PWM drivers are
    // external subsystems. Until they are attached the executable drives the
    // simulated equipment and in-process links.

    let shared = Arc::new(SharedState::new(
        speed_ctrl_params.initial_gain_p,
        speed_ctrl_params.initial_gain_i,
    ));

    let (motor, encoder) = sim::drivetrain(speed_ctrl_params.encoder_incr_distance_m);

    let mut front_steer = SteeringMapper::new(Box::new(sim::SimSteering::new()));
    let mut rear_steer = SteeringMapper::new(Box::new(sim::SimSteering::new()));

    let (mut bus, _bus_peer) =
        ChannelBusLink::new(Duration::from_secs_f64(exec_params.bus_rx_timeout_s));

    let (_remote_tx, remote_rx) = mpsc::channel::<RemoteCommand>();

    info!("Equipment initialised");

    // ---- SPAWN SPEED CONTROL TASK ----

    let speed_ctrl_shutdown = Arc::new(AtomicBool::new(false));

    // The task runs for the lifetime of the executable, so the join handle
    // is never collected
    let _speed_ctrl_handle = {
        let shared = Arc::clone(&shared);
        let shutdown = Arc::clone(&speed_ctrl_shutdown);

        thread::Builder::new()
            .name("speed_ctrl".into())
            .spawn(move || {
                speed_ctrl::run(
                    speed_ctrl_params,
                    shared,
                    Box::new(encoder),
                    Box::new(motor),
                    shutdown,
                )
            })
            .wrap_err("Failed to spawn the speed control task")?
    };

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let cycle_period = Duration::from_secs_f64(exec_params.cycle_period_s);

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start();

        // ---- COMMAND INPUT ----

        // Drain the frames currently queued on the bus, sending out any
        // acknowledgements the handlers produce
        while let Some(frame) = bus.poll() {
            if let Some(ack) = bus_dispatch::exec(&mut ds, &shared, &frame) {
                match bus.send(&ack) {
                    Ok(()) => (),
                    Err(e) => warn!("Could not send acknowledgement frame: {}", e),
                }
            }
        }

        // Drain the remote controller queue, keeping the latest command
        while let Ok(cmd) = remote_rx.try_recv() {
            ds.remote = cmd;
            safety_monitor.note_remote_update();
        }

        // ---- CALIBRATION ----

        // Calibration applied by the dispatch handlers above must be visible
        // to the steering computations later in this same cycle
        front_steer.set_calib(ds.front_calib.offset_rad, ds.front_calib.max_delta_rad);
        rear_steer.set_calib(ds.rear_calib.offset_rad, ds.rear_calib.max_delta_rad);

        // ---- MODE CONTROL PROCESSING ----

        ds.mode_ctrl_input = veh_lib::mode_ctrl::InputData {
            remote: ds.remote,
            lateral: ds.lateral,
            longitudinal: ds.longitudinal,
            safe_to_drive: safety_monitor.verdict(bus.rx_stale()),
            current_speed_ms: shared.veh.speed_ms.load(),
            time_s: session::get_elapsed_seconds(),
        };

        match ds.mode_ctrl.proc(&ds.mode_ctrl_input) {
            Ok((o, r)) => {
                ds.mode_ctrl_output = o;
                ds.mode_ctrl_status_rpt = r;
            }
            Err(e) => warn!("Error during ModeCtrl processing: {}", e),
        };

        // ---- ACTUATOR OUTPUT ----

        steer_ctrl::apply_demand(&mut front_steer, &mut rear_steer, &ds.mode_ctrl_output.steering);

        // Publish the ramp for the speed control task and the achieved wheel
        // angles for observers
        shared.ramp.store(&ds.mode_ctrl_output.ramp);
        shared
            .veh
            .front_wheel_angle_rad
            .store(front_steer.wheel_angle());
        shared
            .veh
            .rear_wheel_angle_rad
            .store(rear_steer.wheel_angle());

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match cycle_period.checked_sub(cycle_dur) {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                thread::sleep(d);
            }
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    (cycle_dur - cycle_period).as_secs_f64()
                );
                ds.num_consec_cycle_overruns += 1;
            }
        }

        // Increment cycle counter
        ds.num_cycles += 1;
    }
}
