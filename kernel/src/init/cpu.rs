//! Processor identification.

use lib_kernel::cpu::{CpuInfo, CpuidSource, HypervisorInfo};
use lib_kernel::{log_debug, log_info};

/// Runs the CPUID queries and logs what came back.
pub fn detect_cpu<C: CpuidSource + ?Sized>(cpuid: &mut C) -> (CpuInfo, Option<HypervisorInfo>) {
    log_info!("Detecting CPU...");
    let cpu = CpuInfo::detect(cpuid);
    log_info!(
        "CPU: {} family {} model {} stepping {}",
        cpu.vendor_str(),
        cpu.family,
        cpu.model,
        cpu.stepping
    );
    if cpu.max_basic_leaf == 0 {
        log_debug!("CPUID leaf 1 not available");
    }

    let hypervisor = HypervisorInfo::detect(cpuid, &cpu);
    if let Some(hv) = &hypervisor {
        log_info!("Running under hypervisor: {}", hv.vendor_str());
        if let Some(features) = hv.hyperv_features {
            log_debug!("Hyper-V features: {:#010x}", features);
        }
    }

    (cpu, hypervisor)
}
