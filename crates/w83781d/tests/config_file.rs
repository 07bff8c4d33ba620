use std::io::Write;
use w83781d::{load_config_file, DriverConfig};

#[test]
fn loads_yaml_from_disk() -> anyhow::Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    writeln!(
        file,
        "max_clients: 2\nrefresh_interval_ms: 1000\ninit:\n  in_margin_percent: 5\n  temp_over: 750"
    )?;
    let cfg = load_config_file(file.path())?;
    assert_eq!(cfg.max_clients, 2);
    assert_eq!(cfg.refresh_interval_ms, 1000);
    assert_eq!(cfg.init.in_margin_percent, 5);
    assert_eq!(cfg.init.temp_over, 750);
    assert_eq!(cfg.init.temp_hyst, DriverConfig::default().init.temp_hyst);
    Ok(())
}

#[test]
fn missing_file_names_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.yaml");
    let err = load_config_file(&path).unwrap_err();
    assert!(format!("{err:#}").contains("absent.yaml"));
}

#[cfg(feature = "mock")]
#[test]
fn configured_limits_reach_the_chip() -> anyhow::Result<()> {
    use std::sync::Arc;
    use w83781d::{registers, sim, Channel, Driver};

    let cfg = w83781d::parse_config("init:\n  fan_min_rpm: 4500\n  temp_over: 750\n")?;
    let driver = Driver::new(cfg)?;
    let chip = Arc::new(sim::simulated_chip());
    let h = driver.attach_smbus(chip.clone(), sim::SMBUS_ADDR)?;
    assert_eq!(chip.get(registers::TEMP_OVER), 75);
    assert_eq!(driver.read(h, Channel::Fan(1))?[0], 4500);
    Ok(())
}
