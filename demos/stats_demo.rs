use clap::Parser;
use robin_map::HashMap;
use robin_map::TableConfig;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'n', long = "entries", default_value_t = 1000)]
    entries: u64,

    #[arg(short = 'c', long = "initial_capacity", default_value_t = 4)]
    initial_capacity: usize,

    #[arg(short = 'l', long = "max_load_factor", default_value_t = 0.42)]
    max_load_factor: f64,
}

fn main() {
    let args = Args::parse();

    let config = match TableConfig::new(args.initial_capacity, args.max_load_factor) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("invalid table configuration: {err}");
            std::process::exit(2);
        }
    };

    println!(
        "Creating HashMap with initial capacity {} and max load factor {}",
        config.initial_capacity(),
        config.max_load_factor()
    );

    let mut map: HashMap<u64, u64> = HashMap::with_config(config);

    println!("Filling map with {} u64 keys...", args.entries);
    let mut growths = 0;
    for key in 0..args.entries {
        let capacity = map.capacity();
        map.insert(key, key * 2);
        if map.capacity() != capacity {
            growths += 1;
        }
    }

    println!("Inserted {} entries into map", map.len());
    println!("Capacity doubled {} times to {}", growths, map.capacity());
    println!(
        "Final load factor: {:.2}%",
        (map.len() as f64 / map.capacity() as f64) * 100.0
    );

    print_histogram(&map.probe_histogram());
    map.debug_stats().print();
}

fn print_histogram(histogram: &[usize]) {
    let total: usize = histogram.iter().sum();
    println!("Probe distance histogram:");
    for (distance, &count) in histogram.iter().enumerate() {
        let share = if total == 0 {
            0.0
        } else {
            count as f64 / total as f64 * 100.0
        };
        println!("  {distance:>3}: {count:>8} ({share:5.2}%)");
    }
}
