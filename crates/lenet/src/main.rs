use burn::prelude::*;
use lenet::{logging::install_logger, LeNetConfig, LeNetError, ModelSummary, SummaryConfig};

fn launch<B: Backend>(device: B::Device) -> Result<(), LeNetError> {
    let model = LeNetConfig::new().init::<B>(&device).to_device(&device);
    let summary = ModelSummary::collect(&model, &SummaryConfig::new(), &device)?;

    println!("{summary}");

    Ok(())
}

#[cfg(any(feature = "ndarray", feature = "ndarray-blas-openblas"))]
mod ndarray {
    use burn::backend::ndarray::{NdArray, NdArrayDevice};

    use crate::launch;

    pub fn run() -> Result<(), lenet::LeNetError> {
        launch::<NdArray>(NdArrayDevice::Cpu)
    }
}

#[cfg(feature = "tch-gpu")]
mod tch_gpu {
    use burn::backend::libtorch::{LibTorch, LibTorchDevice};

    use crate::launch;

    /// CUDA when a device is present, the CPU otherwise. MPS on macOS.
    pub fn select_device(cuda_available: bool) -> LibTorchDevice {
        if cfg!(target_os = "macos") {
            return LibTorchDevice::Mps;
        }

        if cuda_available {
            LibTorchDevice::Cuda(0)
        } else {
            log::warn!("No CUDA device available, falling back to the CPU");
            LibTorchDevice::Cpu
        }
    }

    pub fn run() -> Result<(), lenet::LeNetError> {
        launch::<LibTorch>(select_device(tch::Cuda::is_available()))
    }

}

#[cfg(feature = "tch-cpu")]
mod tch_cpu {
    use burn::backend::libtorch::{LibTorch, LibTorchDevice};

    use crate::launch;

    pub fn run() -> Result<(), lenet::LeNetError> {
        launch::<LibTorch>(LibTorchDevice::Cpu)
    }
}

#[cfg(feature = "wgpu")]
mod wgpu {
    use burn::backend::wgpu::{Wgpu, WgpuDevice};

    use crate::launch;

    pub fn run() -> Result<(), lenet::LeNetError> {
        // Picks the best available adapter, discrete GPU first.
        launch::<Wgpu>(WgpuDevice::default())
    }
}

#[cfg(not(any(
    feature = "ndarray",
    feature = "ndarray-blas-openblas",
    feature = "tch-gpu",
    feature = "tch-cpu",
    feature = "wgpu",
)))]
compile_error!(
    "At least one backend feature must be enabled: ndarray, ndarray-blas-openblas, tch-gpu, tch-cpu or wgpu."
);

fn main() {
    install_logger();

    let mut results: Vec<Result<(), LeNetError>> = Vec::new();

    #[cfg(any(feature = "ndarray", feature = "ndarray-blas-openblas"))]
    results.push(ndarray::run());
    #[cfg(feature = "tch-gpu")]
    results.push(tch_gpu::run());
    #[cfg(feature = "tch-cpu")]
    results.push(tch_cpu::run());
    #[cfg(feature = "wgpu")]
    results.push(wgpu::run());

    for result in results {
        if let Err(err) = result {
            log::error!("Failed to summarize the model: {err}");
            std::process::exit(1);
        }
    }
}
