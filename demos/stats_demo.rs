use clap::Parser;
use swiss_tbl::ProbePolicy;
use swiss_tbl::SipKeyHasher;
use swiss_tbl::SwissTable;
use swiss_tbl::TriangularProbe;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'n', long = "entries", default_value_t = 1000)]
    entries: usize,

    #[arg(short = 's', long = "seed", default_value_t = swiss_tbl::hasher::DEFAULT_SEED)]
    seed: u64,

    /// Probe groups with triangular steps instead of linearly.
    #[arg(long)]
    triangular: bool,
}

fn fill<P: ProbePolicy>(table: &mut SwissTable<String, SipKeyHasher, P>, entries: usize) {
    for i in 0..entries {
        table.insert(format!("key_{i:016X}"), i as i64);
    }
}

fn main() {
    let args = Args::parse();
    let hasher = SipKeyHasher::with_seed(args.seed);

    println!("Filling table with {} entries...", args.entries);

    if args.triangular {
        let mut table = SwissTable::with_hasher_and_probe(hasher, TriangularProbe);
        fill(&mut table, args.entries);
        report(table.len(), table.capacity());
        table.probe_histogram().print();
        table.debug_stats().print();
    } else {
        let mut table = SwissTable::with_hasher(hasher);
        fill(&mut table, args.entries);
        report(table.len(), table.capacity());
        table.probe_histogram().print();
        table.debug_stats().print();
    }
}

fn report(len: usize, capacity: usize) {
    println!("Inserted {} entries into {} slots", len, capacity);
    println!(
        "Final load factor: {:.2}%",
        (len as f64 / capacity.max(1) as f64) * 100.0
    );
}
