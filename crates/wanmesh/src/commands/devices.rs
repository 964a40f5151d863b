//! Device model command handlers.

use tabled::Tabled;

use wanmesh_core::DeviceModel;

use crate::cli::{DevicesArgs, DevicesCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output::{self, Painter};

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "ID")]
    id: u8,
    #[tabled(rename = "Role")]
    role: String,
    #[tabled(rename = "Serial")]
    serial: String,
    #[tabled(rename = "Loopback")]
    loopback: String,
    #[tabled(rename = "ASN")]
    asn: u32,
    #[tabled(rename = "Remotes")]
    remotes: usize,
    #[tabled(rename = "Tunnels")]
    tunnels: usize,
    #[tabled(rename = "Routes")]
    routes: usize,
}

impl DeviceRow {
    fn new(d: &DeviceModel, painter: Painter) -> Self {
        Self {
            name: d.name.clone(),
            id: d.id.get(),
            role: painter.role(d.role),
            serial: d.serial.clone(),
            loopback: d.loopback.to_string(),
            asn: d.asn,
            remotes: d.remotes.len(),
            tunnels: d.tunnel_count(),
            routes: d.route_count(),
        }
    }
}

fn or_dash<T: ToString>(value: Option<&T>) -> String {
    value.map_or_else(|| "-".into(), ToString::to_string)
}

fn detail(d: &DeviceModel, painter: Painter) -> String {
    let mut lines = vec![
        format!("Name:     {}", d.name),
        format!("ID:       {}", d.id),
        format!("Role:     {}", painter.role(d.role)),
        format!("Serial:   {}", d.serial),
        format!("Template: {}", d.template),
        format!("Loopback: {}", d.loopback),
        format!("ASN:      {}", d.asn),
    ];

    lines.push(String::new());
    lines.push(painter.heading("Interfaces"));
    for (key, intf) in &d.interfaces {
        lines.push(format!(
            "  {key:<8} {:<14} {:<18} zone={} profile={}",
            intf.name,
            or_dash(intf.address.as_ref()),
            or_dash(intf.zone.as_ref()),
            or_dash(intf.sdwan_profile.as_ref()),
        ));
    }

    for (name, remote) in &d.remotes {
        lines.push(String::new());
        lines.push(painter.heading(&format!(
            "Remote {name} (id={}, sdwan.{}, loopback {})",
            remote.id, remote.sdwan_interface, remote.loopback
        )));
        for (tunnel_name, t) in &remote.tunnels {
            lines.push(format!(
                "  {:<11} {tunnel_name:<24} {} monitor {} via {} peer {}",
                t.interface,
                t.tunnel_ip,
                t.monitor_ip,
                t.local_interface,
                or_dash(t.peer_ip.as_ref()),
            ));
        }
        for (net, route) in &remote.routes {
            lines.push(format!(
                "  route {net} via {} gw {}",
                route.interface, route.gateway
            ));
        }
    }
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: DevicesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::resolve(global)?;
    let assembly = util::assemble(&cfg.topology)?;
    let painter = Painter::new(&global.color);

    match args.command {
        DevicesCommand::List => {
            let devices: Vec<&DeviceModel> = assembly.devices.values().collect();
            let out = output::render_list(
                &global.output,
                &devices,
                |d| DeviceRow::new(d, painter),
                |d| d.name.clone(),
            );
            output::print_output(&out, global.quiet);
        }

        DevicesCommand::Show { device } => {
            let Some(model) = assembly.device(&device) else {
                return Err(CliError::NotFound {
                    resource_type: "device".into(),
                    identifier: device,
                    list_command: "devices list".into(),
                });
            };
            let out = output::render_single(
                &global.output,
                model,
                |d| detail(d, painter),
                |d| d.name.clone(),
            );
            output::print_output(&out, global.quiet);
        }
    }
    Ok(())
}
