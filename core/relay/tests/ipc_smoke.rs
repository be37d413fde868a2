use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::thread::sleep;
use std::time::{Duration, Instant};

use habit_widget_core::{
    BackgroundDelivery, SocketDelivery, StorageConfig, WidgetConfig, WidgetEngine, WidgetSize,
    WidgetView, DEFAULT_APP_GROUP,
};
use tempfile::TempDir;

struct RelayGuard {
    child: Child,
}

impl Drop for RelayGuard {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn relay_command(group_dir: &Path) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_habit-relay"));
    command
        .env("HABIT_WIDGET_GROUP_DIR", group_dir)
        .env_remove("HABIT_WIDGET_SOCKET");
    command
}

fn add_task(group_dir: &Path, name: &str) -> String {
    let output = relay_command(group_dir)
        .args(["add", name])
        .output()
        .expect("Failed to run habit-relay add");
    assert!(output.status.success(), "habit-relay add failed");
    String::from_utf8(output.stdout)
        .expect("task id is UTF-8")
        .trim()
        .to_string()
}

fn spawn_relay(group_dir: &Path) -> RelayGuard {
    let child = relay_command(group_dir)
        .arg("serve")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("Failed to spawn habit-relay");
    RelayGuard { child }
}

fn wait_for_socket(path: &Path, timeout: Duration) {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if path.exists() {
            return;
        }
        sleep(Duration::from_millis(25));
    }
    panic!("Timed out waiting for relay socket at {}", path.display());
}

fn wait_for_view(
    widget: &WidgetEngine,
    timeout: Duration,
    done: impl Fn(&WidgetView) -> bool,
) -> WidgetView {
    let deadline = Instant::now() + timeout;
    loop {
        let view = widget.view(false, WidgetSize::Full);
        if done(&view) || Instant::now() >= deadline {
            return view;
        }
        sleep(Duration::from_millis(25));
    }
}

#[test]
fn relay_applies_widget_toggle_and_republishes() {
    let group = TempDir::new().expect("Failed to create temp app group");
    let storage = StorageConfig::with_root(group.path().to_path_buf());

    let first = add_task(group.path(), "Make Bed");
    let second = add_task(group.path(), "Brush Teeth");

    let _guard = spawn_relay(group.path());
    wait_for_socket(&storage.socket_path(), Duration::from_secs(2));

    let delivery = Arc::new(SocketDelivery::new(storage.socket_path()));
    let widget = WidgetEngine::with_delivery(storage.clone(), WidgetConfig::default(), delivery);

    let before = widget.view(false, WidgetSize::Full);
    assert_eq!(before.count_badge, "2");
    assert_eq!(before.rows[0].id, first);
    assert!(!before.rows[0].completed);

    widget.complete(second.clone()).expect("dispatch complete");

    let after = wait_for_view(&widget, Duration::from_secs(2), |view| view.rows[1].completed);
    assert!(after.rows[1].completed, "relay never published the toggle");
    assert!(!after.rows[0].completed);
    assert_eq!(after.count_badge, "2");
}

#[test]
fn relay_ignores_delivery_for_other_app_group() {
    let group = TempDir::new().expect("Failed to create temp app group");
    let storage = StorageConfig::with_root(group.path().to_path_buf());
    let task_id = add_task(group.path(), "Stretch");

    let _guard = spawn_relay(group.path());
    wait_for_socket(&storage.socket_path(), Duration::from_secs(2));

    let delivery = SocketDelivery::new(storage.socket_path());
    let url = format!("habitWidget://complete?id={task_id}");
    delivery
        .submit(&url, "group.someone.else")
        .expect("submit foreign delivery");
    delivery
        .submit("habitWidget://task:add?id=", DEFAULT_APP_GROUP)
        .expect("submit add-task delivery");

    // Deliveries are handled independently; give both a chance to land.
    sleep(Duration::from_millis(300));

    let widget = WidgetEngine::with_delivery(
        storage,
        WidgetConfig::default(),
        Arc::new(SocketDelivery::new(group.path().join("unused.sock"))),
    );
    let view = widget.view(false, WidgetSize::Full);
    assert_eq!(view.rows.len(), 1);
    assert!(!view.rows[0].completed);
}

#[test]
fn relay_keeps_tasks_added_by_another_process_while_serving() {
    let group = TempDir::new().expect("Failed to create temp app group");
    let storage = StorageConfig::with_root(group.path().to_path_buf());
    let first = add_task(group.path(), "Make Bed");

    let _guard = spawn_relay(group.path());
    wait_for_socket(&storage.socket_path(), Duration::from_secs(2));

    let second = add_task(group.path(), "Brush Teeth");

    let delivery = Arc::new(SocketDelivery::new(storage.socket_path()));
    let widget = WidgetEngine::with_delivery(storage.clone(), WidgetConfig::default(), delivery);
    assert_eq!(widget.view(false, WidgetSize::Full).count_badge, "2");

    widget.complete(second.clone()).expect("dispatch complete");
    let view = wait_for_view(&widget, Duration::from_secs(2), |view| {
        view.rows.len() == 2 && view.rows[1].completed
    });
    assert!(view.rows[1].completed, "serve ignored a task it did not load");

    widget.complete(first.clone()).expect("dispatch complete");
    let view = wait_for_view(&widget, Duration::from_secs(2), |view| {
        view.rows.len() == 2 && view.rows[0].completed
    });
    assert_eq!(view.count_badge, "2");
    assert_eq!(view.rows[0].id, first);
    assert_eq!(view.rows[1].id, second);
    assert!(view.rows.iter().all(|row| row.completed));

    let canonical: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(storage.canonical_tasks_file()).expect("read canonical tasks"),
    )
    .expect("canonical tasks are JSON");
    let tasks = canonical["tasks"].as_array().expect("tasks array");
    assert_eq!(tasks.len(), 2);
    assert!(tasks.iter().all(|task| task["completed"] == true));
}
