//! Device ABI probing.
//!
//! The engine's native binary targets one instruction-set family; the
//! device reports the families it supports. Comparing the two is how the
//! loader detects that an ARM build is running under binary translation
//! on an x86 device. The probe degrades through three tiers: the ordered
//! ABI list from the platform, an external "get CPU ABI" query, and a
//! deprecated single-value field kept for very old platforms.

use std::io::{self, Read};
use std::process::{Command, Stdio};

use tracing::debug;

/// Where ABI information comes from.
///
/// Split out from [`DeviceAbi::probe`] so the degraded tiers can be
/// exercised without an actual degraded platform. A tier returning
/// `None` is structurally unavailable and the probe moves on; an empty
/// result is still a result.
pub trait PlatformAbi {
    /// The ordered list of supported ABIs, primary first. `None` when
    /// the platform does not expose the list at all.
    fn supported_abis(&self) -> Option<Vec<String>>;

    /// Invoke the external CPU-ABI query and return its raw output.
    /// Blocking, no timeout; only reached on degraded platforms.
    fn cpu_abi_query(&self) -> io::Result<String>;

    /// The deprecated single-value ABI field, if the platform still
    /// carries one.
    fn legacy_cpu_abi(&self) -> Option<String>;
}

/// The running system.
#[derive(Debug, Default)]
pub struct SystemAbi;

impl PlatformAbi for SystemAbi {
    fn supported_abis(&self) -> Option<Vec<String>> {
        // Ordered ABI list for the architecture this process runs on.
        // 64-bit devices also run their 32-bit siblings, so those come
        // after the primary, same as the platform reports them.
        match std::env::consts::ARCH {
            "x86_64" => Some(vec!["x86_64".into(), "x86".into()]),
            "x86" => Some(vec!["x86".into()]),
            "aarch64" => Some(vec!["arm64-v8a".into(), "armeabi-v7a".into()]),
            "arm" => Some(vec!["armeabi-v7a".into(), "armeabi".into()]),
            _ => None,
        }
    }

    fn cpu_abi_query(&self) -> io::Result<String> {
        let mut child = Command::new("getprop")
            .arg("ro.product.cpu.abi")
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;
        let mut output = String::new();
        if let Some(stdout) = child.stdout.as_mut() {
            stdout.read_to_string(&mut output)?;
        }
        child.wait()?;
        Ok(output)
    }

    fn legacy_cpu_abi(&self) -> Option<String> {
        Some(std::env::consts::ARCH.to_string())
    }
}

/// The device's supported ABIs, primary first. Immutable once probed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceAbi {
    abis: Vec<String>,
}

impl DeviceAbi {
    /// Probe the platform, applying the fallback tiers in order.
    ///
    /// Each tier is attempted only when the previous one is
    /// structurally unavailable. When every tier fails the primary ABI
    /// is the empty string, which callers see as an anomaly rather than
    /// an error from here.
    pub fn probe(platform: &dyn PlatformAbi) -> Self {
        if let Some(abis) = platform.supported_abis() {
            debug!("supported ABIs: {}", abis.join(", "));
            return Self { abis };
        }

        let abi = match platform.cpu_abi_query() {
            Ok(output) => output.lines().next().unwrap_or("").trim().to_string(),
            // The query may report incorrectly under binary translation
            // anyway; fall through to the deprecated field.
            Err(err) => {
                debug!("CPU ABI query failed: {err}");
                platform.legacy_cpu_abi().unwrap_or_default()
            }
        };
        debug!("device ABI: {abi}");

        if abi.is_empty() {
            Self { abis: Vec::new() }
        } else {
            Self { abis: vec![abi] }
        }
    }

    /// Build directly from a known list, primary first.
    pub fn from_list(abis: Vec<String>) -> Self {
        Self { abis }
    }

    /// The primary ABI, or `""` when probing failed entirely.
    pub fn primary(&self) -> &str {
        self.abis.first().map(String::as_str).unwrap_or("")
    }

    /// All supported ABIs in preference order.
    pub fn all(&self) -> &[String] {
        &self.abis
    }

    /// Whether the primary ABI is an x86-family architecture.
    pub fn is_x86_family(&self) -> bool {
        let primary = self.primary();
        primary.eq_ignore_ascii_case("x86") || primary.eq_ignore_ascii_case("x86_64")
    }
}
