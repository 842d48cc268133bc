#![no_main]

use aeawb::controller::AeAwbController;
use aeawb::isp::HistogramStats;
use aeawb::sensor::{SensorState, SimulatedSensor};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Any snapshot that survives validation must be processable without panicking
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(stats) = serde_json::from_str::<HistogramStats>(s) {
            let mut state = SensorState::default();
            let mut sensor = SimulatedSensor::new();
            AeAwbController::default().process_frame(&stats, &mut state, &mut sensor);
        }
    }
});
