use log::{debug, warn};
use std::cell::RefCell;
use std::os::unix::process::CommandExt;
use std::process::{Child, Command, Stdio};

/// Fire-and-forget process launcher. The window manager never waits on or
/// inspects what it starts.
pub trait Spawner {
    fn spawn(&self, command: &[String]);
}

/// Launches commands in their own process group and reaps them lazily on
/// later spawns so they never linger as zombies.
#[derive(Default)]
pub struct ProcessSpawner {
    children: RefCell<Vec<Child>>,
}

impl ProcessSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    fn reap(&self) {
        self.children
            .borrow_mut()
            .retain_mut(|child| matches!(child.try_wait(), Ok(None)));
    }
}

impl Spawner for ProcessSpawner {
    fn spawn(&self, command: &[String]) {
        self.reap();

        let Some((program, args)) = command.split_first() else {
            warn!("ignoring empty spawn command");
            return;
        };

        match Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .process_group(0)
            .spawn()
        {
            Ok(child) => {
                debug!("spawned {:?} as pid {}", command, child.id());
                self.children.borrow_mut().push(child);
            }
            Err(e) => warn!("failed to spawn {:?}: {}", command, e),
        }
    }
}

/// Wraps a shell snippet as `sh -c <snippet>`.
pub fn shell_command(snippet: &str) -> Vec<String> {
    vec!["sh".to_string(), "-c".to_string(), snippet.to_string()]
}
