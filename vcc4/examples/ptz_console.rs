use clap::Parser;
use std::time::Duration;
use tracing::{error, info, level_filters::LevelFilter, warn};
use tracing_subscriber::EnvFilter;
use vcc4::{
    protocol::{LedMode, DEFAULT_DEVICE_ID},
    CameraVariant, CommState, Config, Ptz, Result, StateUpdate, Vcc4, Vcc4SerialChannel,
};

/// Points a VC-C4 camera somewhere, and reports what it does.
#[derive(Debug, Parser)]
#[clap(verbatim_doc_comment)]
struct CliParser {
    /// Serial port the camera is connected to.
    #[clap(short, long)]
    pub port: String,

    #[clap(long, default_value_t = DEFAULT_DEVICE_ID)]
    pub device_id: u8,

    /// Use `unidirectional` if the CTS line is not connected.
    #[clap(long, value_enum, default_value_t = CommState::Unknown)]
    pub comm_mode: CommState,

    #[clap(long, value_enum, default_value_t = CameraVariant::Base)]
    pub variant: CameraVariant,

    /// Pan angle, in degrees.
    #[clap(long, default_value_t = 0., allow_hyphen_values = true)]
    pub pan: f64,

    /// Tilt angle, in degrees.
    #[clap(long, default_value_t = 0., allow_hyphen_values = true)]
    pub tilt: f64,

    #[clap(long, default_value_t = 0)]
    pub zoom: i32,

    #[clap(long, value_enum)]
    pub led: Option<LedMode>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .compact()
        .init();
    let opts = CliParser::parse();

    let channel = Vcc4SerialChannel::open(&opts.port)?;
    let mut cam = Vcc4::new(
        channel,
        Config {
            device_id: opts.device_id,
            comm_mode: opts.comm_mode,
            variant: opts.variant,
            ..Default::default()
        },
    );
    cam.push_error_callback_back(|| warn!("camera reported an error"));

    cam.init()?;
    cam.set_pan_tilt(opts.pan, opts.tilt)?;
    cam.set_zoom(opts.zoom)?;
    if let Some(led) = opts.led {
        cam.set_led_control_mode(led);
    }

    let mut interval = tokio::time::interval(Duration::from_millis(50));
    loop {
        interval.tick().await;
        if let Err(e) = cam.poll_serial() {
            error!("reading from {}: {e}", opts.port);
        }

        let update = cam.tick();
        if update.is_empty() {
            continue;
        }

        if update.contains(StateUpdate::PROTOCOL_STATE) {
            info!("State: {:?} -> {:?}", cam.previous_state(), cam.state());
        }

        if update.contains(StateUpdate::COMM_STATE) {
            info!("Communication: {:?}", cam.comm_state());
        }

        if update.contains(StateUpdate::POWER) {
            info!("Powered: {}", cam.is_powered());
        }

        if update.contains(StateUpdate::PRODUCT_NAME) {
            info!("Product name: {:?}", cam.product_name());
        }

        if update.contains(StateUpdate::PAN_TILT) {
            info!("Pan/tilt: {:.2}, {:.2}", cam.pan(), cam.tilt());
        }

        if update.contains(StateUpdate::ZOOM) {
            info!("Zoom: {}", cam.zoom());
        }

        if update.contains(StateUpdate::ZOOM_LIMIT) {
            info!("Maximum zoom: {}", cam.max_zoom());
        }

        if update.contains(StateUpdate::LED) {
            info!("LED: {:?}", cam.led_control_mode());
        }
    }
}
