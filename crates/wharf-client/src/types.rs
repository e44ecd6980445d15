//! Wire types for the daemon API.
//!
//! Field names are camelCase; [`crate::wire`] supplies the daemon's
//! first-letter-uppercase casing on encode/decode. Deserialization is
//! lenient: the daemon freely omits fields across versions, so almost
//! everything is optional or defaulted.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// System-wide daemon information (`GET /info`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SystemInfo {
    pub containers: Option<i64>,
    pub images: Option<i64>,
    pub driver: Option<String>,
    pub kernel_version: Option<String>,
    pub operating_system: Option<String>,
    pub mem_total: Option<i64>,
    pub docker_root_dir: Option<String>,
    pub index_server_address: Option<String>,
    pub name: Option<String>,
}

/// Daemon version information (`GET /version`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Version {
    pub version: Option<String>,
    pub api_version: Option<String>,
    pub go_version: Option<String>,
    pub git_commit: Option<String>,
    pub os: Option<String>,
    pub arch: Option<String>,
    pub kernel_version: Option<String>,
}

/// One image in the daemon's image list (`GET /images/json`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Image {
    pub id: String,
    pub parent_id: Option<String>,
    pub repo_tags: Vec<String>,
    pub created: Option<i64>,
    pub size: Option<i64>,
    pub virtual_size: Option<i64>,
}

/// Detailed image information (`GET /images/{name}/json`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageInfo {
    pub id: String,
    pub parent: Option<String>,
    pub created: Option<String>,
    pub container: Option<String>,
    pub container_config: Option<ContainerConfig>,
    pub config: Option<ContainerConfig>,
    pub docker_version: Option<String>,
    pub author: Option<String>,
    pub architecture: Option<String>,
    pub os: Option<String>,
    pub size: Option<i64>,
    pub virtual_size: Option<i64>,
}

/// Container creation configuration (`POST /containers/create`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContainerConfig {
    pub image: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cmd: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub entrypoint: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domainname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<String>,
    pub attach_stdin: bool,
    pub attach_stdout: bool,
    pub attach_stderr: bool,
    pub tty: bool,
    pub open_stdin: bool,
    pub stdin_once: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_swap: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_shares: Option<i64>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub exposed_ports: HashMap<String, serde_json::Value>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub volumes: HashMap<String, serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_config: Option<HostConfig>,
}

/// Host-side container configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HostConfig {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub binds: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<String>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub port_bindings: HashMap<String, Vec<PortBinding>>,
    pub publish_all_ports: bool,
    pub privileged: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dns: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub volumes_from: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_mode: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra_hosts: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cap_add: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cap_drop: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restart_policy: Option<RestartPolicy>,
}

/// Container restart policy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RestartPolicy {
    pub name: Option<String>,
    pub maximum_retry_count: Option<i64>,
}

/// One port binding on the host side.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PortBinding {
    pub host_ip: Option<String>,
    pub host_port: Option<String>,
}

/// Response to container creation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContainerCreated {
    pub id: String,
    pub warnings: Vec<String>,
}

/// Detailed container information (`GET /containers/{id}/json`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContainerInfo {
    pub id: String,
    pub created: Option<String>,
    pub path: Option<String>,
    pub args: Vec<String>,
    pub name: Option<String>,
    pub image: Option<String>,
    pub driver: Option<String>,
    pub config: Option<ContainerConfig>,
    pub host_config: Option<HostConfig>,
    pub state: Option<ContainerState>,
    pub network_settings: Option<NetworkSettings>,
    pub volumes: HashMap<String, String>,
}

/// Runtime state of a container.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContainerState {
    pub running: bool,
    pub paused: bool,
    pub pid: Option<i64>,
    pub exit_code: Option<i64>,
    pub started_at: Option<String>,
    pub finished_at: Option<String>,
}

/// Network configuration of a running container.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NetworkSettings {
    pub ip_address: Option<String>,
    pub gateway: Option<String>,
    pub bridge: Option<String>,
    pub ports: HashMap<String, Option<Vec<PortBinding>>>,
}

/// Exit status from `POST /containers/{id}/wait`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContainerExitStatus {
    pub status_code: i64,
}

/// Process listing from `GET /containers/{id}/top`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContainerProcesses {
    pub titles: Vec<String>,
    pub processes: Vec<Vec<String>>,
}

/// Body of `POST /containers/{id}/copy`: the in-container resource path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContainerResource {
    pub resource: String,
}

/// Response to `POST /commit`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContainerCommitted {
    pub id: String,
}

/// Exec creation configuration (`POST /containers/{id}/exec`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExecConfig {
    pub attach_stdin: bool,
    pub attach_stdout: bool,
    pub attach_stderr: bool,
    pub tty: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cmd: Vec<String>,
}

/// Response to exec creation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExecCreated {
    pub id: String,
}

/// Body of `POST /exec/{id}/start`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExecStart {
    pub detach: bool,
    pub tty: bool,
}

/// Detailed exec information (`GET /exec/{id}/json`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExecInfo {
    pub id: String,
    pub running: bool,
    pub exit_code: Option<i64>,
    pub open_stdin: bool,
    pub open_stdout: bool,
    pub open_stderr: bool,
    pub process_config: Option<ProcessConfig>,
    pub container: Option<ContainerInfo>,
}

/// Process description inside exec information.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProcessConfig {
    pub tty: bool,
    pub privileged: bool,
    pub entrypoint: Option<String>,
    pub arguments: Vec<String>,
    pub user: Option<String>,
}

/// One daemon event (`GET /events`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Event {
    pub status: Option<String>,
    pub id: Option<String>,
    pub from: Option<String>,
    pub time: Option<i64>,
}

/// One decoded increment of a build/push/pull operation.
///
/// Free-form `stream` lines and structured progress records share this
/// shape; the daemon populates whichever fields apply.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgressStatus {
    pub status: Option<String>,
    pub stream: Option<String>,
    pub error: Option<String>,
    pub error_detail: Option<ErrorDetail>,
    pub id: Option<String>,
    pub from: Option<String>,
    pub time: Option<i64>,
    pub progress: Option<String>,
    pub progress_detail: Option<ProgressDetail>,
}

/// Structured error attached to a progress record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ErrorDetail {
    pub code: Option<i64>,
    pub message: Option<String>,
}

/// Structured byte counts attached to a progress record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgressDetail {
    pub current: Option<i64>,
    pub total: Option<i64>,
    pub start: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::{self, FirstLetterUppercase};

    #[test]
    fn container_config_round_trips_through_wire_names() {
        let config = ContainerConfig {
            image: "alpine:latest".to_string(),
            cmd: vec!["echo".to_string(), "hello".to_string()],
            working_dir: Some("/work".to_string()),
            tty: true,
            ..ContainerConfig::default()
        };
        let bytes = wire::encode(&config, &FirstLetterUppercase).unwrap();
        let wire_value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(wire_value["Image"], "alpine:latest");
        assert_eq!(wire_value["WorkingDir"], "/work");
        assert_eq!(wire_value["Tty"], true);

        let back: ContainerConfig = wire::decode(&bytes, &FirstLetterUppercase).unwrap();
        assert_eq!(back.image, config.image);
        assert_eq!(back.cmd, config.cmd);
        assert_eq!(back.working_dir, config.working_dir);
    }

    #[test]
    fn exit_status_decodes_from_wire() {
        let status: ContainerExitStatus =
            wire::decode(br#"{"StatusCode": 137}"#, &FirstLetterUppercase).unwrap();
        assert_eq!(status.status_code, 137);
    }

    #[test]
    fn port_binding_keys_survive_translation() {
        let mut host_config = HostConfig::default();
        host_config.port_bindings.insert(
            "8080/tcp".to_string(),
            vec![PortBinding {
                host_ip: Some("0.0.0.0".to_string()),
                host_port: Some("8080".to_string()),
            }],
        );
        let bytes = wire::encode(&host_config, &FirstLetterUppercase).unwrap();
        let wire_value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(wire_value["PortBindings"]["8080/tcp"].is_array());
        let back: HostConfig = wire::decode(&bytes, &FirstLetterUppercase).unwrap();
        assert_eq!(back.port_bindings["8080/tcp"][0].host_port, Some("8080".to_string()));
    }

    #[test]
    fn progress_status_tolerates_unknown_fields() {
        let status: ProgressStatus = wire::decode(
            br#"{"Stream": "Step 1/3", "Unexpected": {"Nested": 1}}"#,
            &FirstLetterUppercase,
        )
        .unwrap();
        assert_eq!(status.stream.as_deref(), Some("Step 1/3"));
    }
}
