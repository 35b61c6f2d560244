use stepnorm::Normalizer;
use stepnorm::report::{reference_scenarios, run_scenarios};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    println!("🧪 Testing step response normalization...\n");

    let report = run_scenarios(&Normalizer::default(), &reference_scenarios());
    println!("{report}");

    if report.passed() {
        println!("\n🎉 All tests passed!");
    } else {
        println!("\n❌ Test failed");
        std::process::exit(1);
    }
}
