//! PXE boot-file rendering.
//!
//! Turns a server + template pair into the installer answer file
//! (kickstart for the Red Hat family, preseed for the Debian family) and
//! decides where under the TFTP root it belongs. Writing the file is the
//! caller's job; everything here is pure.

use std::path::PathBuf;

use crate::error::CoreError;

/// Directory (relative to the TFTP root) holding per-MAC pxelinux configs.
pub const LEGACY_CONFIG_DIR: &str = "pxelinux.cfg";

/// UEFI grub config (relative to the TFTP root).
pub const UEFI_CONFIG_PATH: &str = "efi/boot/grub.cfg";

/// pxelinux ARP hardware type prefix for Ethernet.
const ETHERNET_PREFIX: &str = "01";

/// Installer family, derived from a template's `systemType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallerKind {
    Kickstart,
    Preseed,
}

impl InstallerKind {
    /// Map a free-form system type to an installer. Case-insensitive.
    pub fn for_system_type(system_type: &str) -> Result<Self, CoreError> {
        match system_type.trim().to_ascii_lowercase().as_str() {
            "centos" | "rhel" => Ok(Self::Kickstart),
            "ubuntu" | "debian" => Ok(Self::Preseed),
            other => Err(CoreError::Validation(format!(
                "Unsupported system type '{other}' for PXE rendering. \
                 Must be one of: centos, rhel, ubuntu, debian"
            ))),
        }
    }
}

/// Server attributes the answer file needs.
#[derive(Debug, Clone, Copy)]
pub struct BootTarget<'a> {
    pub serial: &'a str,
    pub hostname: &'a str,
    pub ip_address: &'a str,
    pub mac_address: &'a str,
    pub gateway: &'a str,
    pub lan_nic: &'a str,
}

/// Template attributes the answer file needs.
#[derive(Debug, Clone, Copy)]
pub struct InstallSource<'a> {
    pub system_type: &'a str,
    pub config_content: &'a str,
    pub kernel_params: &'a str,
    pub packages: &'a str,
}

/// A rendered answer file plus every path (relative to the TFTP root) it
/// must be written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootFile {
    pub kind: InstallerKind,
    pub paths: Vec<PathBuf>,
    pub content: String,
}

/// Convert a MAC address into its pxelinux file name (`01-aa-bb-cc-dd-ee-ff`).
///
/// Accepts `:`- or `-`-separated and bare forms.
pub fn pxelinux_file_name(mac: &str) -> Result<String, CoreError> {
    let cleaned: String = mac
        .chars()
        .filter(|c| *c != ':' && *c != '-')
        .collect::<String>()
        .to_ascii_lowercase();

    if cleaned.len() != 12 || !cleaned.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(CoreError::Validation(format!(
            "Invalid MAC address '{mac}'"
        )));
    }

    let octets: Vec<&str> = (0..12).step_by(2).map(|i| &cleaned[i..i + 2]).collect();
    Ok(format!("{ETHERNET_PREFIX}-{}", octets.join("-")))
}

/// Render the answer file for `target` from `source`.
pub fn render(
    target: &BootTarget<'_>,
    source: &InstallSource<'_>,
    uefi: bool,
) -> Result<BootFile, CoreError> {
    let kind = InstallerKind::for_system_type(source.system_type)?;
    let file_name = pxelinux_file_name(target.mac_address)?;

    let content = match kind {
        InstallerKind::Kickstart => kickstart(target, source),
        InstallerKind::Preseed => preseed(target, source),
    };

    let mut paths = vec![PathBuf::from(LEGACY_CONFIG_DIR).join(file_name)];
    if uefi {
        paths.push(PathBuf::from(UEFI_CONFIG_PATH));
    }

    Ok(BootFile {
        kind,
        paths,
        content,
    })
}

fn kickstart(t: &BootTarget<'_>, s: &InstallSource<'_>) -> String {
    format!(
        "#version=RHEL8\n\
         # Generated for {serial} ({mac})\n\
         \n\
         install\n\
         lang en_US.UTF-8\n\
         keyboard us\n\
         network --hostname={hostname} --device={nic} --bootproto=static --ip={ip} --gateway={gw}\n\
         \n\
         {content}\n\
         \n\
         # kernel: {kernel}\n\
         \n\
         %packages\n\
         {packages}\n\
         %end\n\
         \n\
         reboot\n",
        serial = t.serial,
        mac = t.mac_address,
        hostname = t.hostname,
        nic = t.lan_nic,
        ip = t.ip_address,
        gw = t.gateway,
        content = s.config_content,
        kernel = s.kernel_params,
        packages = s.packages,
    )
}

fn preseed(t: &BootTarget<'_>, s: &InstallSource<'_>) -> String {
    format!(
        "# Preseed for {serial} ({mac})\n\
         \n\
         d-i debian-installer/locale string en_US\n\
         d-i keyboard-configuration/xkb-keymap select us\n\
         d-i netcfg/get_hostname string {hostname}\n\
         d-i netcfg/get_ipaddress string {ip}\n\
         d-i netcfg/get_gateway string {gw}\n\
         \n\
         {content}\n\
         \n\
         # Kernel parameters\n\
         d-i debian-installer/add-kernel-opts string {kernel}\n\
         \n\
         # Packages\n\
         d-i pkgsel/include string {packages}\n",
        serial = t.serial,
        mac = t.mac_address,
        hostname = t.hostname,
        ip = t.ip_address,
        gw = t.gateway,
        content = s.config_content,
        kernel = s.kernel_params,
        packages = s.packages,
    )
}
