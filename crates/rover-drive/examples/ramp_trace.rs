use rover_drive::*;

fn main() {
    let ramp = RampConfig::default();
    println!("Ramp: {} duty per {:?} tick", ramp.step(), ramp.interval());

    for target in [0.3, 0.6, 1.0] {
        match Speed::new(target) {
            Ok(speed) => {
                let schedule: Vec<f32> = ramp.plan(speed).collect();
                let duration = ramp.interval() * schedule.len() as u32;
                println!("\nTarget {speed} reached in {} ticks ({duration:?}):", schedule.len());
                for (i, duty) in schedule.iter().enumerate() {
                    println!("  Tick {:>2}: {:.2}", i + 1, duty);
                }
            }
            Err(e) => {
                eprintln!("Invalid target {target}: {e}");
            }
        }
    }
}
