/// Bayesian-style linear regression fitted with random feed-dict batches
///
/// Learns `w` and a positive noise scale for y = x·w + ε on a small synthetic
/// dataset. Pass a JSON batch config path as the first argument to override
/// the defaults.
use aboleth_rs::{pos_default, BatchConfig, BatchGenerator, FeedDataset, FeedSource};
use candle_core::{DType, Device, Tensor};
use candle_nn::{Init, Optimizer, VarBuilder, VarMap, SGD};
use ndarray::{stack, Array1, Array2, Axis};

const N: usize = 100;

/// x1 spans [-10, 10], x2 = linspace(-1, 1)^2, y = x·[0.5, 2.0] + noise
fn make_data(device: &Device) -> anyhow::Result<FeedDataset<f64>> {
    let x1 = Array1::linspace(-10.0, 10.0, N);
    let x2 = Array1::linspace(-1.0, 1.0, N).mapv(|v: f64| v * v);
    let x: Array2<f64> = stack(Axis(1), &[x1.view(), x2.view()])?;

    let w = Array2::from_shape_vec((2, 1), vec![0.5, 2.0])?;
    let noise = Tensor::randn(0f64, 1.0, (N, 1), device)?.flatten_all()?.to_vec1::<f64>()?;
    let y = x.dot(&w) + Array2::from_shape_vec((N, 1), noise)?;

    Ok(FeedDataset::from_arrays([("x", x.into_dyn()), ("y", y.into_dyn())])?)
}

fn main() -> anyhow::Result<()> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("=== Linear regression with positive noise scale ===");

    let device = Device::Cpu;

    let config = match std::env::args().nth(1) {
        Some(path) => BatchConfig::from_json_file(path)?,
        None => BatchConfig::new(10).with_n_iter(Some(5000)).with_seed(666),
    };
    log::info!("Batch configuration: {:#?}", config);

    let data = make_data(&device)?;
    log::info!("Dataset: {} samples, keys {:?}", N, data.keys().collect::<Vec<_>>());

    let varmap = VarMap::new();
    let vb = VarBuilder::from_varmap(&varmap, DType::F64, &device);
    let w = vb.get_with_hints((2, 1), "w", Init::Const(0.0))?;
    let raw_sigma = vb.get_with_hints(1, "raw_sigma", Init::Const(1.0))?;

    let mut optimizer = SGD::new(varmap.all_vars(), 1e-5)?;

    let mut source = BatchGenerator::from_config(&data, &config)?;
    match source.num_batches() {
        Some(n) => log::info!("Training for {} batches", n),
        None => log::info!("Training on an unbounded batch stream; stop with Ctrl+C"),
    }

    let mut step = 0usize;
    while let Some(feed) = source.next_feed(&device)? {
        let n = feed[config.count_key.as_str()].to_scalar::<i64>()? as f64;
        let x = &feed["x"];
        let y = &feed["y"];

        let sigma = pos_default(&raw_sigma)?;
        let resid = y.sub(&x.matmul(&w)?)?.broadcast_div(&sigma)?;
        let nll = (resid.sqr()? * 0.5)?.broadcast_add(&sigma.log()?)?.mean_all()?;
        // Scale the batch average up to the full dataset
        let loss = (nll * n)?;

        optimizer.backward_step(&loss)?;
        step += 1;

        if step % 500 == 0 {
            log::info!("Step {}: loss={:.4}", step, loss.to_scalar::<f64>()?);
        }
    }

    let w_fit = w.flatten_all()?.to_vec1::<f64>()?;
    let sigma_fit = pos_default(&raw_sigma)?.to_vec1::<f64>()?;

    log::info!("=== Training complete after {} steps ===", step);
    log::info!("w = {:.4?} (expected [0.5, 2.0])", w_fit);
    log::info!("sigma = {:.4} (expected ~1.0)", sigma_fit[0]);

    Ok(())
}
