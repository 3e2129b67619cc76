use serde_json::json;
use tempfile::TempDir;
use viam_chatgpt::config::ComponentConfig;
use viam_chatgpt::default_registry;
use viam_chatgpt::resource::{Dependencies, ResourceHandle, Sensor, ValueMap};
use viam_chatgpt::utils::ModuleError;

const WIRELESS: &str = "Inter-| sta-|   Quality        |   Discarded packets               | Missed | WE
 face | tus | link level noise |  nwid  crypt   frag  retry   misc | beacon | 22
 wlan0: 0000   70.  -40.  -256        0      0      0      0      0        0
 wlan1: 0000   35.  -75.  -256        0      0      0      0      0        0
";

fn wifi_config(attributes: serde_json::Value) -> ComponentConfig {
    serde_json::from_value(json!({
        "name": "wifi",
        "type": "sensor",
        "model": "jeremyrhyde:sensor:wifi",
        "attributes": attributes
    }))
    .unwrap()
}

async fn readings(config: &ComponentConfig) -> Result<ValueMap, ModuleError> {
    let registry = default_registry().unwrap();
    let ResourceHandle::Sensor(sensor) = registry.create(config, &Dependencies::new()).await?
    else {
        panic!("wifi should be a sensor");
    };
    sensor.get_readings(None).await
}

#[tokio::test]
async fn test_readings_first_interface() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("wireless");
    std::fs::write(&path, WIRELESS).unwrap();

    let values = readings(&wifi_config(json!({"path": path}))).await.unwrap();

    assert_eq!(values["interface"], "wlan0");
    assert_eq!(values["link"], 70.0);
    assert_eq!(values["level"], -40.0);
    assert_eq!(values["noise"], -256.0);
}

#[tokio::test]
async fn test_readings_named_interface() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("wireless");
    std::fs::write(&path, WIRELESS).unwrap();

    let values = readings(&wifi_config(json!({"path": path, "interface": "wlan1"})))
        .await
        .unwrap();
    assert_eq!(values["level"], -75.0);

    let err = readings(&wifi_config(json!({"path": path, "interface": "wlan9"})))
        .await
        .unwrap_err();
    assert!(matches!(err, ModuleError::NotFound { .. }));
}

#[tokio::test]
async fn test_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let err = readings(&wifi_config(json!({"path": dir.path().join("absent")})))
        .await
        .unwrap_err();
    assert!(matches!(err, ModuleError::Io { .. }));
}

#[tokio::test]
async fn test_sensor_do_command_unimplemented() {
    let registry = default_registry().unwrap();
    let handle = registry
        .create(&wifi_config(json!({})), &Dependencies::new())
        .await
        .unwrap();

    let err = handle.do_command(ValueMap::new()).await.unwrap_err();
    assert!(matches!(err, ModuleError::Unimplemented { .. }));
}
