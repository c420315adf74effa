//! AquaGuard Forecast Pipeline Example
//!
//! Simulates a distribution line with random-walk sensors, then runs the
//! forecast-and-compare pipeline twice:
//!
//! 1. Normal operation: the forecast should track the held-out readings
//! 2. Pipe leak: pressure collapses and flow surges during the held-out
//!    period, which the leak rule should catch
//!
//! Training uses a reduced network so the example finishes in seconds; the
//! field deployment uses the defaults (two layers of 50 units, 50 epochs).

use aquaguard_core::time::MS_PER_HOUR;
use aquaguard_core::{CancelToken, Reading, ReadingSequence, Timestamp};
use aquaguard_ml::{
    plan_maintenance, Ambient, ForecastPipeline, MaintenanceLimits, PipelineConfig, StatusTransition,
    SystemStatus, TrainingConfig,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const START: Timestamp = 1_704_067_200_000;

/// Random-walk sensors clamped to the station's physical range
struct LineSimulator {
    rng: StdRng,
    pressure: f64,
    flow_rate: f64,
    water_quality: f64,
    temperature: f64,
}

impl LineSimulator {
    fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            pressure: 100.0,
            flow_rate: 50.0,
            water_quality: 100.0,
            temperature: 20.0,
        }
    }

    fn step(&mut self) -> [f64; 4] {
        self.pressure = (self.pressure + self.rng.gen_range(-0.5..0.5)).clamp(0.0, 120.0);
        self.flow_rate = (self.flow_rate + self.rng.gen_range(-0.3..0.3)).clamp(0.0, 100.0);
        self.water_quality = (self.water_quality + self.rng.gen_range(-0.2..0.2)).clamp(0.0, 100.0);
        self.temperature = (self.temperature + self.rng.gen_range(-0.2..0.2)).clamp(-10.0, 40.0);
        [self.pressure, self.flow_rate, self.water_quality, self.temperature]
    }

    fn readings(&mut self, count: usize) -> Vec<Reading> {
        (0..count)
            .map(|i| Reading::new(START + i as i64 * MS_PER_HOUR, self.step()))
            .collect()
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== AquaGuard Forecast Pipeline Example ===\n");

    let config = PipelineConfig::default().with_training(
        TrainingConfig::default()
            .with_hidden_size(16)
            .with_num_layers(1)
            .with_epochs(10),
    );
    let pipeline = ForecastPipeline::lstm(config.clone());
    let cancel = CancelToken::new();

    println!("Phase 1: Normal Operation");
    println!("=========================");
    let normal = LineSimulator::new(7).readings(config.required_readings());
    let sequence = ReadingSequence::from_readings(normal.clone())?;
    let run = pipeline.run(&sequence, Ambient::fixed(24.0), &cancel)?;
    println!("{}\n", run.summary);
    println!(
        "Training: {} epochs, loss {:.5}, validation {:?}\n",
        run.training.epochs_run, run.training.final_loss, run.training.validation_loss
    );

    let previous = SystemStatus::from_summary(&run.summary, 50.0);

    println!("Phase 2: Pipe Leak During Held-Out Period");
    println!("=========================================");
    let mut leaking = normal;
    for reading in leaking.iter_mut().skip(config.train_size) {
        reading.pressure -= 15.0;
        reading.flow_rate += 12.0;
    }
    let sequence = ReadingSequence::from_readings(leaking)?;
    let run = pipeline.run(&sequence, Ambient::fixed(33.0), &cancel)?;
    println!("{}\n", run.summary);

    let current = SystemStatus::from_summary(&run.summary, 50.0);
    match StatusTransition::between(previous, current).notification() {
        Some(message) => println!("Notification: {}", message),
        None => println!("Status unchanged: {}", current),
    }

    println!("\nPredictive Maintenance");
    println!("======================");
    let plan = plan_maintenance(&sequence, None, &MaintenanceLimits::default(), START)?;
    println!("{}", plan);

    Ok(())
}
