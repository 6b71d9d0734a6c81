//! corridor — end-to-end greenwave demo.
//!
//! Replays the full pipeline on an embedded 6×4 grid map: decode junction
//! and polyline records, build the road graph, seed background traffic,
//! pick a destination hospital and the farthest spawn junctions, run two
//! priority agents with tiered signal preemption, and write the frame,
//! signal, and congestion records plus the run summary.

use std::io::Cursor;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;

use gw_core::{AgentId, RunConfig, SimRng, Tick};
use gw_records::words::{TokenWidth, pack_congestion, pack_signal};
use gw_records::{RecordWriter, scan_str, words};
use gw_runtime::{RunObserver, RunSummary, SessionBuilder};
use gw_signal::{CycleConfig, SignalController};
use gw_spatial::{DestinationRegistry, GeometryStore, RouteQuery, RouteSolver, build_graph};
use gw_traffic::{CongestionModel, SeedConfig, distribute_fleet, warm_up};

// ── Constants ─────────────────────────────────────────────────────────────────

const AGENT_COUNT: usize = 2;
const SEED: u64 = 42;
const REPLAN_INTERVAL_TICKS: u64 = 5;
const MAX_TICKS: u64 = 1_000;
const OUT_DIR: &str = "output/corridor";

// ── Embedded map records ──────────────────────────────────────────────────────

// 24 junctions on a 6×4 grid: x ∈ {40, …, 440} step 80, y ∈ {60, …, 300}
// step 80.  Junction word: x in bits [19:10], y in bits [9:0].
const JUNCTION_RECORDS: &str = "\
memory_initialization_radix=16;
memory_initialization_vector=
0A03C,
1E03C,
3203C,
4603C,
5A03C,
6E03C,
0A08C,
1E08C,
3208C,
4608C,
5A08C,
6E08C,
0A0DC,
1E0DC,
320DC,
460DC,
5A0DC,
6E0DC,
0A12C,
1E12C,
3212C,
4612C,
5A12C,
6E12C;
";

// One polyline per street segment; bit 19 flags the segment end.  The first
// y=140 street carries an interior point at (80,140) — only the endpoints
// snap to junctions.
const POLYLINE_RECORDS: &str = "\
memory_initialization_radix=16;
memory_initialization_vector=
0A03C,
9E03C,
1E03C,
B203C,
3203C,
C603C,
4603C,
DA03C,
5A03C,
EE03C,
0A08C,
1408C,
9E08C,
1E08C,
B208C,
3208C,
C608C,
4608C,
DA08C,
5A08C,
EE08C,
0A0DC,
9E0DC,
1E0DC,
B20DC,
320DC,
C60DC,
460DC,
DA0DC,
5A0DC,
EE0DC,
0A12C,
9E12C,
1E12C,
B212C,
3212C,
C612C,
4612C,
DA12C,
5A12C,
EE12C,
0A03C,
8A08C,
0A08C,
8A0DC,
0A0DC,
8A12C,
1E03C,
9E08C,
1E08C,
9E0DC,
1E0DC,
9E12C,
3203C,
B208C,
3208C,
B20DC,
320DC,
B212C,
4603C,
C608C,
4608C,
C60DC,
460DC,
C612C,
5A03C,
DA08C,
5A08C,
DA0DC,
5A0DC,
DA12C,
6E03C,
EE08C,
6E08C,
EE0DC,
6E0DC,
EE12C;
";

// Destination hospitals: x, y, capacity (beds), capability flag.
const DESTINATION_CSV: &str = "\
460,90,220,1.0
210,150,80,0.0
";

// ── Progress observer ─────────────────────────────────────────────────────────

struct Progress {
    interval: u64,
}

impl RunObserver for Progress {
    fn on_tick_end(&mut self, tick: Tick, active: usize) {
        if tick.0 % self.interval == 0 {
            info!("{tick}: {active} agent(s) active");
        }
    }

    fn on_run_end(&mut self, summary: &RunSummary) {
        info!(
            "run ended after {} tick(s), complete = {}",
            summary.ticks, summary.complete
        );
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::init();

    println!("=== corridor — greenwave preemption demo ===");
    println!("Agents: {AGENT_COUNT}  |  Seed: {SEED}  |  Replan every {REPLAN_INTERVAL_TICKS} ticks");
    println!();

    // 1. Decode the embedded map records and build the graph.
    let junction_scan = scan_str(JUNCTION_RECORDS);
    let store = GeometryStore::from_words(&junction_scan.values);
    let polylines = words::decode_polylines(&scan_str(POLYLINE_RECORDS).values);
    let graph = build_graph(&store, &polylines);
    println!(
        "Road graph: {} junctions, {} edges ({} malformed token(s) skipped)",
        graph.junction_count(),
        graph.edge_count(),
        junction_scan.skipped
    );

    // 2. Destination registry.
    let destinations = DestinationRegistry::from_reader(Cursor::new(DESTINATION_CSV), &store)?;
    println!("Destinations: {}", destinations.len());

    // 3. Seed signals and background traffic.
    let mut rng = SimRng::new(SEED);
    let mut signals =
        SignalController::with_random_offsets(store.junction_count(), CycleConfig::default(), &mut rng);
    let mut congestion = CongestionModel::new(store.junction_count());
    let seed_config = SeedConfig {
        total_vehicles: 600,
        min_per_junction: 50,
        ..SeedConfig::default()
    };
    let active = distribute_fleet(&mut congestion, &seed_config, &mut rng);
    warm_up(&mut congestion, &mut signals, &active, &seed_config, &mut rng);
    println!(
        "Traffic seeded: {} vehicles over {} junction(s), peak {}",
        congestion.total(),
        active.len(),
        congestion.max()
    );

    // 4. Select the destination from a provisional spawn, then place the
    //    agents at the junctions farthest from the chosen destination.
    let solver = RouteSolver::default();
    let reference = destinations.junction(gw_core::DestinationId(0));
    let provisional = solver.farthest_spawn(&graph, reference)?;

    let selection = solver.solve(&graph, &congestion, RouteQuery::WeightedDestinationSelection {
        start: provisional,
        destinations: &destinations,
    })?;
    let target_id = selection.destination.expect("destination selection returns one");
    let target = destinations.junction(target_id);
    let spawns = solver.farthest_spawns(&graph, target, AGENT_COUNT)?;
    println!(
        "Selected destination {} (junction {}), spawns: {:?}",
        target_id.0,
        target.0,
        spawns.iter().map(|j| j.0).collect::<Vec<_>>()
    );
    println!();

    // 5. Build and run the session.
    let config = RunConfig {
        replan_interval_ticks: REPLAN_INTERVAL_TICKS,
        max_ticks: MAX_TICKS,
        seed: SEED,
    };
    let mut builder = SessionBuilder::new(graph, congestion, signals, config).solver(solver);
    for &spawn in &spawns {
        builder = builder.agent(spawn, target);
    }
    let mut session = builder.build()?;

    let summary = session.run(&mut Progress { interval: 10 });

    // 6. Write the output records.
    let out_dir = Path::new(OUT_DIR);
    std::fs::create_dir_all(out_dir).context("creating output directory")?;

    for i in 0..AGENT_COUNT {
        let agent = AgentId(i as u32);
        let mut writer =
            RecordWriter::with_capacity(TokenWidth::Word32, session.frames(agent).len());
        writer.extend(session.frames(agent).iter().copied());
        writer.finish(&out_dir.join(format!("agent_{i}_frames.coe")))?;
    }

    let mut signal_writer =
        RecordWriter::with_capacity(TokenWidth::Word16, session.signals().junction_count());
    for j in 0..session.signals().junction_count() {
        let state = session.signals().effective(gw_core::JunctionId(j as u32));
        signal_writer.push(pack_signal(state.phase.code(), state.timer) as u32);
    }
    signal_writer.finish(&out_dir.join("signals_final.coe"))?;

    let mut congestion_writer =
        RecordWriter::with_capacity(TokenWidth::Word16, session.congestion().junction_count());
    for &count in session.congestion().counts() {
        congestion_writer.push(pack_congestion(count) as u32);
    }
    congestion_writer.finish(&out_dir.join("congestion_final.coe"))?;

    std::fs::write(out_dir.join("run_summary.txt"), summary.to_string())?;

    // 7. Final report.
    println!("Outputs written to {OUT_DIR}/");
    println!();
    println!("{:<8} {:<8} {:<8} {:<10} {:<8} {:<6}", "Agent", "Spawn", "Target", "RouteLen", "Replans", "Done");
    println!("{}", "-".repeat(52));
    for report in &summary.agents {
        println!(
            "{:<8} {:<8} {:<8} {:<10} {:<8} {:<6}",
            report.agent.0,
            report.spawn.0,
            report.target.0,
            report.route_len,
            report.replans,
            report.completed,
        );
    }
    if summary.incomplete() {
        println!("(tick budget exhausted — partial results above)");
    }

    Ok(())
}
