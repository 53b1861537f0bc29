//! Start-up tasks: logger, store, seeding.

use anyhow::{Context, Result};
use chrono::{Duration, TimeZone, Utc};
use env_logger::{Builder, Env};
use log::kv::Key;
use log::{info, warn};
use std::io::Write;

use crate::common::VIEW_TARGET_PERMISSION;
use crate::config::AppConfig;
use crate::database::ops::store::TargetStore;
use crate::database::schema::grant::group_principal;
use crate::models::target::NewTarget;

// ────────────────────────────────────────────────────────────────
// Logger Initialization
// ────────────────────────────────────────────────────────────────

/// Format the `duration` key-value (e.g. `1.234567ms`) as `1.23 ms`.
fn format_duration(raw: &str) -> String {
    if let Some(idx) = raw.find(|c: char| c.is_alphabetic() || c == 'µ') {
        let (num, unit) = (&raw[..idx], &raw[idx..]);
        if let Ok(val) = num.parse::<f32>() {
            return format!("{:.2} {}", val, unit);
        }
    }
    raw.to_string()
}

/// Initialize the global logger. `RUST_LOG` overrides the default filter.
pub fn initialize_logger() {
    Builder::from_env(Env::default().default_filter_or("info,rocket=warn"))
        .format(|buf, record| {
            let ts = buf.timestamp();
            let level_style = buf.default_level_style(record.level());
            let lvl = format!(
                "{}{:<5}{}",
                level_style.render(),
                record.level(),
                level_style.render_reset()
            );

            let dur = record
                .key_values()
                .get(Key::from("duration"))
                .map(|v| format_duration(&v.to_string()))
                .unwrap_or_default();

            // Right-align the duration column; blank when absent.
            writeln!(
                buf,
                "{} {} {} {:>10} {}",
                ts,
                lvl,
                record.target(),
                dur,
                record.args()
            )
        })
        .init();
}

// ────────────────────────────────────────────────────────────────
// Store Initialization
// ────────────────────────────────────────────────────────────────

pub fn initialize_store(config: &AppConfig) -> Result<TargetStore> {
    let store = TargetStore::open(&config.db_path)?;

    match (&config.admin_username, &config.admin_password) {
        (Some(username), Some(password)) => {
            store
                .upsert_user(username, password, true, &[VIEW_TARGET_PERMISSION], &[])
                .context("Failed to create admin user")?;
            info!("Admin user '{}' ready", username);
        }
        (Some(_), None) | (None, Some(_)) => {
            warn!("Both TARGETVIEW_ADMIN_USERNAME and TARGETVIEW_ADMIN_PASSWORD are required; skipping admin user");
        }
        (None, None) => {}
    }

    if config.seed_demo {
        seed_demo(&store)?;
    }

    Ok(store)
}

/// Load a handful of well-known targets into an empty store and share
/// them with the `observers` group.
pub fn seed_demo(store: &TargetStore) -> Result<()> {
    if store.count_targets()? > 0 {
        info!("Store already has targets, skipping demo seed");
        return Ok(());
    }

    let base = Utc
        .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .context("Invalid seed timestamp")?;
    let demo = vec![
        NewTarget::sidereal("M31", 10.6847, 41.2690)
            .alias("Andromeda Galaxy")
            .extra("redshift", -0.001),
        NewTarget::sidereal("M42", 83.8221, -5.3911).alias("Orion Nebula"),
        NewTarget::sidereal("Vega", 279.2347, 38.7837).extra("vmag", 0.03),
        NewTarget::sidereal("Betelgeuse", 88.7929, 7.4071).extra("vmag", 0.5),
        NewTarget::sidereal("NGC 4993", 197.4488, -23.3839)
            .alias("GW170817 host")
            .extra("redshift", 0.0098),
        NewTarget::sidereal("SN 2023ixf", 210.9106, 54.3117)
            .extra("classification", "SN II"),
        NewTarget::non_sidereal("C/2020 F3").alias("NEOWISE"),
        NewTarget::non_sidereal("1P/Halley"),
    ];

    let mut ids = Vec::with_capacity(demo.len());
    for (offset, target) in demo.into_iter().enumerate() {
        let target = target.created(base + Duration::days(offset as i64));
        let id = store.insert_target(target)?;
        store.grant(&group_principal("observers"), id)?;
        ids.push(id);
    }
    store.create_target_list("Bright stars", &ids[2..4])?;
    store.create_target_list("Transients", &ids[4..6])?;

    info!("Seeded {} demo targets", ids.len());
    Ok(())
}
