//! CPU identification via the CPUID instruction.
//!
//! Detection runs once at boot and produces an immutable [`CpuInfo`] value.
//! Leaf 0 supplies the vendor string and the highest basic leaf; leaf 1
//! supplies the signature (family/model/stepping) and the two feature masks.
//! Extended family/model fields are deliberately not decoded.

use core::fmt;

/// Highest-leaf / vendor query.
pub const CPUID_VENDOR: u32 = 0x0000_0000;
/// Signature and feature-flag query.
pub const CPUID_FEATURES: u32 = 0x0000_0001;
/// Hypervisor vendor and maximum hypervisor leaf.
pub const CPUID_HYPERVISOR_VENDOR: u32 = 0x4000_0000;
/// Hyper-V partition privilege/feature mask (EAX).
pub const CPUID_HYPERV_FEATURES: u32 = 0x4000_0003;

/// "Microsoft Hv" as packed into EBX, ECX, EDX of leaf 0x4000_0000.
const HYPERV_SIGNATURE: [u32; 3] = [0x7263_694D, 0x666F_736F, 0x7648_2074];

/// Raw register output of one CPUID query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuidRegs {
    pub eax: u32,
    pub ebx: u32,
    pub ecx: u32,
    pub edx: u32,
}

/// Anything that can answer CPUID queries.
pub trait CpuidSource {
    fn cpuid(&mut self, leaf: u32) -> CpuidRegs;
}

/// Executes the real `cpuid` instruction.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeCpuid;

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
impl CpuidSource for NativeCpuid {
    #[allow(unused_unsafe)]
    fn cpuid(&mut self, leaf: u32) -> CpuidRegs {
        #[cfg(target_arch = "x86_64")]
        let result = unsafe { core::arch::x86_64::__cpuid(leaf) };
        #[cfg(target_arch = "x86")]
        let result = unsafe { core::arch::x86::__cpuid(leaf) };

        CpuidRegs {
            eax: result.eax,
            ebx: result.ebx,
            ecx: result.ecx,
            edx: result.edx,
        }
    }
}

/// Which leaf-1 register a feature bit lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FeatureRegister {
    Edx,
    Ecx,
}

/// Leaf-1 feature bits the boot report knows by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuFeature {
    Fpu,
    Tsc,
    Msr,
    Pae,
    Apic,
    Mmx,
    Sse,
    Sse2,
    Sse3,
    Hypervisor,
}

impl CpuFeature {
    /// All named features, in report order.
    pub const ALL: [CpuFeature; 10] = [
        CpuFeature::Fpu,
        CpuFeature::Tsc,
        CpuFeature::Msr,
        CpuFeature::Pae,
        CpuFeature::Apic,
        CpuFeature::Mmx,
        CpuFeature::Sse,
        CpuFeature::Sse2,
        CpuFeature::Sse3,
        CpuFeature::Hypervisor,
    ];

    const fn location(self) -> (FeatureRegister, u32) {
        match self {
            CpuFeature::Fpu => (FeatureRegister::Edx, 0),
            CpuFeature::Tsc => (FeatureRegister::Edx, 4),
            CpuFeature::Msr => (FeatureRegister::Edx, 5),
            CpuFeature::Pae => (FeatureRegister::Edx, 6),
            CpuFeature::Apic => (FeatureRegister::Edx, 9),
            CpuFeature::Mmx => (FeatureRegister::Edx, 23),
            CpuFeature::Sse => (FeatureRegister::Edx, 25),
            CpuFeature::Sse2 => (FeatureRegister::Edx, 26),
            CpuFeature::Sse3 => (FeatureRegister::Ecx, 0),
            CpuFeature::Hypervisor => (FeatureRegister::Ecx, 31),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            CpuFeature::Fpu => "FPU",
            CpuFeature::Tsc => "TSC",
            CpuFeature::Msr => "MSR",
            CpuFeature::Pae => "PAE",
            CpuFeature::Apic => "APIC",
            CpuFeature::Mmx => "MMX",
            CpuFeature::Sse => "SSE",
            CpuFeature::Sse2 => "SSE2",
            CpuFeature::Sse3 => "SSE3",
            CpuFeature::Hypervisor => "HYPERVISOR",
        }
    }
}

impl fmt::Display for CpuFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Packs three registers into a NUL-terminated 12-character string buffer.
/// Non-ASCII bytes become `?`.
fn pack_signature(words: [u32; 3]) -> [u8; 13] {
    let mut out = [0u8; 13];
    for (chunk, word) in out[..12].chunks_exact_mut(4).zip(words) {
        chunk.copy_from_slice(&word.to_le_bytes());
    }
    for byte in out[..12].iter_mut() {
        if !byte.is_ascii() {
            *byte = b'?';
        }
    }
    out
}

fn signature_str(bytes: &[u8; 13]) -> &str {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(12);
    core::str::from_utf8(&bytes[..end]).unwrap_or("")
}

/// Processor identity captured once at boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuInfo {
    /// Leaf-0 EBX, EDX, ECX in vendor-string order.
    pub vendor_id: [u32; 3],
    vendor: [u8; 13],
    /// Highest basic leaf reported by leaf 0 (EAX).
    pub max_basic_leaf: u32,
    pub family: u8,
    pub model: u8,
    pub stepping: u8,
    pub features_edx: u32,
    pub features_ecx: u32,
}

impl CpuInfo {
    /// Runs the leaf 0 and leaf 1 queries.
    ///
    /// Leaf 1 is skipped when leaf 0 reports no basic leaves beyond 0, in
    /// which case the signature and feature masks stay zero.
    pub fn detect<C: CpuidSource + ?Sized>(cpuid: &mut C) -> Self {
        let leaf0 = cpuid.cpuid(CPUID_VENDOR);
        let vendor_id = [leaf0.ebx, leaf0.edx, leaf0.ecx];

        let mut info = CpuInfo {
            vendor_id,
            vendor: pack_signature(vendor_id),
            max_basic_leaf: leaf0.eax,
            family: 0,
            model: 0,
            stepping: 0,
            features_edx: 0,
            features_ecx: 0,
        };

        if leaf0.eax >= CPUID_FEATURES {
            let leaf1 = cpuid.cpuid(CPUID_FEATURES);
            info.stepping = (leaf1.eax & 0xF) as u8;
            info.model = ((leaf1.eax >> 4) & 0xF) as u8;
            info.family = ((leaf1.eax >> 8) & 0xF) as u8;
            info.features_edx = leaf1.edx;
            info.features_ecx = leaf1.ecx;
        }

        info
    }

    /// The 12-character vendor string, e.g. `GenuineIntel`.
    pub fn vendor_str(&self) -> &str {
        signature_str(&self.vendor)
    }

    /// Vendor bytes including the trailing NUL, non-ASCII bytes replaced.
    pub fn vendor_bytes(&self) -> &[u8; 13] {
        &self.vendor
    }

    pub fn has(&self, feature: CpuFeature) -> bool {
        let (register, bit) = feature.location();
        let mask = match register {
            FeatureRegister::Edx => self.features_edx,
            FeatureRegister::Ecx => self.features_ecx,
        };
        mask & (1 << bit) != 0
    }

    /// Named features present on this CPU, in report order.
    pub fn features(&self) -> impl Iterator<Item = CpuFeature> + '_ {
        CpuFeature::ALL.into_iter().filter(move |&f| self.has(f))
    }
}

/// Hypervisor identity, present only when the hypervisor feature bit is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HypervisorInfo {
    pub max_leaf: u32,
    vendor: [u8; 13],
    /// Hyper-V feature mask (leaf 0x4000_0003 EAX); `None` for other hypervisors.
    pub hyperv_features: Option<u32>,
}

impl HypervisorInfo {
    pub fn detect<C: CpuidSource + ?Sized>(cpuid: &mut C, cpu: &CpuInfo) -> Option<Self> {
        if !cpu.has(CpuFeature::Hypervisor) {
            return None;
        }

        let leaf = cpuid.cpuid(CPUID_HYPERVISOR_VENDOR);
        let signature = [leaf.ebx, leaf.ecx, leaf.edx];
        let hyperv_features = if signature == HYPERV_SIGNATURE {
            Some(cpuid.cpuid(CPUID_HYPERV_FEATURES).eax)
        } else {
            None
        };

        Some(HypervisorInfo {
            max_leaf: leaf.eax,
            vendor: pack_signature(signature),
            hyperv_features,
        })
    }

    pub fn vendor_str(&self) -> &str {
        signature_str(&self.vendor)
    }

    pub fn is_hyperv(&self) -> bool {
        self.hyperv_features.is_some()
    }
}
