//! Audio playback controls.
//!
//! [`Playback`] keeps the transport state (position, rate, play/pause) for the
//! active question's clip. Decoding is left to an optional external player
//! process; without one the position clock still runs so the controls behave
//! the same.

use std::process::Stdio;
use std::time::{Duration, Instant};

use log::{debug, warn};
use tokio::process::{Child, Command};

/// Selectable playback speeds.
pub const PLAYBACK_RATES: [f32; 8] = [0.25, 0.5, 0.75, 1.0, 2.0, 4.0, 5.0, 10.0];

const NORMAL_RATE_INDEX: usize = 3;

#[derive(Debug, thiserror::Error, PartialEq)]
#[error("unsupported playback rate {0}")]
pub struct UnsupportedRate(pub f32);

pub struct Playback {
    url: String,
    rate_index: usize,
    position: Duration,
    resumed_at: Option<Instant>,
    duration: Option<Duration>,
    player: Option<ExternalPlayer>,
}

impl Playback {
    pub fn new(url: impl Into<String>, player: Option<String>) -> Self {
        Self {
            url: url.into(),
            rate_index: NORMAL_RATE_INDEX,
            position: Duration::ZERO,
            resumed_at: None,
            duration: None,
            player: player.map(ExternalPlayer::new),
        }
    }

    /// Stop playback and point at a new clip, keeping the rate and player.
    pub fn load(&mut self, url: impl Into<String>) {
        self.pause_at(Instant::now());
        self.url = url.into();
        self.position = Duration::ZERO;
        self.duration = None;
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_playing(&self) -> bool {
        self.resumed_at.is_some()
    }

    pub fn rate(&self) -> f32 {
        PLAYBACK_RATES[self.rate_index]
    }

    /// Clip length when known.
    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    fn set_duration(&mut self, duration: Option<Duration>) {
        self.duration = duration;
        self.position = self.clamp(self.position);
    }

    /// Notice a player that exited on its own. A clean exit means the clip
    /// played to the end, which fixes its duration.
    pub fn poll(&mut self) {
        self.poll_at(Instant::now());
    }

    pub fn poll_at(&mut self, now: Instant) {
        let Some(clean) = self.player.as_mut().and_then(ExternalPlayer::finished) else {
            return;
        };

        self.position = self.current_time_at(now);
        self.resumed_at = None;
        if clean {
            debug!("{} ended at {:?}", self.url, self.position);
            self.set_duration(Some(self.position));
        }
    }

    pub fn current_time(&self) -> Duration {
        self.current_time_at(Instant::now())
    }

    pub fn current_time_at(&self, now: Instant) -> Duration {
        let elapsed = self
            .resumed_at
            .map(|resumed| now.saturating_duration_since(resumed).mul_f32(self.rate()))
            .unwrap_or_default();
        self.clamp(self.position + elapsed)
    }

    pub fn toggle(&mut self) {
        self.toggle_at(Instant::now());
    }

    pub fn toggle_at(&mut self, now: Instant) {
        if self.is_playing() {
            self.pause_at(now);
        } else {
            self.play_at(now);
        }
    }

    pub fn seek(&mut self, to: Duration) {
        self.seek_at(to, Instant::now());
    }

    pub fn seek_at(&mut self, to: Duration, now: Instant) {
        let playing = self.is_playing();
        self.pause_at(now);
        self.position = self.clamp(to);
        if playing {
            self.play_at(now);
        }
    }

    /// Move by `delta_secs`, negative to rewind.
    pub fn seek_by(&mut self, delta_secs: f32) {
        self.seek_by_at(delta_secs, Instant::now());
    }

    pub fn seek_by_at(&mut self, delta_secs: f32, now: Instant) {
        let current = self.current_time_at(now).as_secs_f32();
        let target = (current + delta_secs).max(0.0);
        self.seek_at(Duration::from_secs_f32(target), now);
    }

    pub fn set_rate(&mut self, rate: f32) -> Result<(), UnsupportedRate> {
        let index = PLAYBACK_RATES
            .iter()
            .position(|candidate| *candidate == rate)
            .ok_or(UnsupportedRate(rate))?;
        self.set_rate_index(index, Instant::now());
        Ok(())
    }

    pub fn faster(&mut self) {
        if self.rate_index + 1 < PLAYBACK_RATES.len() {
            self.set_rate_index(self.rate_index + 1, Instant::now());
        }
    }

    pub fn slower(&mut self) {
        if let Some(index) = self.rate_index.checked_sub(1) {
            self.set_rate_index(index, Instant::now());
        }
    }

    fn set_rate_index(&mut self, index: usize, now: Instant) {
        let playing = self.is_playing();
        self.pause_at(now);
        self.rate_index = index;
        if playing {
            self.play_at(now);
        }
    }

    fn play_at(&mut self, now: Instant) {
        if self.duration.is_some_and(|d| self.position >= d) {
            self.position = Duration::ZERO;
        }
        self.resumed_at = Some(now);
        let (position, rate) = (self.position, self.rate());
        if let Some(player) = self.player.as_mut() {
            player.play(&self.url, position, rate);
        }
    }

    fn pause_at(&mut self, now: Instant) {
        if self.resumed_at.is_none() {
            return;
        }
        self.position = self.current_time_at(now);
        self.resumed_at = None;
        if let Some(player) = self.player.as_mut() {
            player.stop();
        }
    }

    fn clamp(&self, position: Duration) -> Duration {
        match self.duration {
            Some(duration) => position.min(duration),
            None => position,
        }
    }
}

/// An mpv-compatible command-line player restarted at the requested offset and speed.
struct ExternalPlayer {
    program: String,
    child: Option<Child>,
}

impl ExternalPlayer {
    fn new(program: String) -> Self {
        Self {
            program,
            child: None,
        }
    }

    fn play(&mut self, url: &str, from: Duration, rate: f32) {
        self.stop();

        let spawned = Command::new(&self.program)
            .arg("--no-video")
            .arg(format!("--start={:.2}", from.as_secs_f32()))
            .arg(format!("--speed={rate}"))
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn();

        match spawned {
            Ok(child) => {
                debug!("started {} for {}", self.program, url);
                self.child = Some(child);
            }
            Err(e) => warn!("failed to start player {}: {}", self.program, e),
        }
    }

    /// `Some(success)` once the running player has exited by itself.
    fn finished(&mut self) -> Option<bool> {
        let child = self.child.as_mut()?;
        let clean = match child.try_wait() {
            Ok(Some(status)) => status.success(),
            Ok(None) => return None,
            Err(e) => {
                warn!("lost track of player {}: {}", self.program, e);
                false
            }
        };
        self.child = None;
        Some(clean)
    }

    fn stop(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.start_kill() {
                debug!("player already exited: {}", e);
            }
        }
    }
}

impl Drop for ExternalPlayer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playback() -> Playback {
        Playback::new("https://example.com/clip.mp3", None)
    }

    #[test]
    fn test_clock_advances_only_while_playing() {
        let mut playback = playback();
        let start = Instant::now();

        playback.toggle_at(start);
        assert!(playback.is_playing());
        assert_eq!(
            playback.current_time_at(start + Duration::from_secs(4)),
            Duration::from_secs(4)
        );

        playback.toggle_at(start + Duration::from_secs(4));
        assert!(!playback.is_playing());
        assert_eq!(
            playback.current_time_at(start + Duration::from_secs(60)),
            Duration::from_secs(4)
        );
    }

    #[test]
    fn test_rate_scales_clock() {
        let mut playback = playback();
        playback.set_rate(2.0).unwrap();
        let start = Instant::now();
        playback.toggle_at(start);
        assert_eq!(
            playback.current_time_at(start + Duration::from_secs(3)),
            Duration::from_secs(6)
        );
    }

    #[test]
    fn test_rates_limited_to_fixed_set() {
        let mut playback = playback();
        assert_eq!(playback.rate(), 1.0);
        assert_eq!(playback.set_rate(1.5), Err(UnsupportedRate(1.5)));
        assert_eq!(playback.rate(), 1.0);

        for rate in PLAYBACK_RATES {
            playback.set_rate(rate).unwrap();
            assert_eq!(playback.rate(), rate);
        }
    }

    #[test]
    fn test_faster_and_slower_stop_at_ends() {
        let mut playback = playback();
        for _ in 0..20 {
            playback.faster();
        }
        assert_eq!(playback.rate(), 10.0);
        for _ in 0..20 {
            playback.slower();
        }
        assert_eq!(playback.rate(), 0.25);
    }

    #[test]
    fn test_seek_clamps_to_bounds() {
        let mut playback = playback();
        playback.set_duration(Some(Duration::from_secs(30)));
        let now = Instant::now();

        playback.seek_at(Duration::from_secs(45), now);
        assert_eq!(playback.current_time_at(now), Duration::from_secs(30));

        playback.seek_by_at(-100.0, now);
        assert_eq!(playback.current_time_at(now), Duration::ZERO);

        playback.seek_by_at(5.0, now);
        assert_eq!(playback.current_time_at(now), Duration::from_secs(5));
    }

    #[test]
    fn test_poll_without_player_keeps_playing() {
        let mut playback = playback();
        let start = Instant::now();
        playback.toggle_at(start);
        playback.poll_at(start + Duration::from_secs(3));
        assert!(playback.is_playing());
        assert_eq!(playback.duration(), None);
    }

    #[test]
    fn test_load_resets_position() {
        let mut playback = playback();
        let now = Instant::now();
        playback.seek_at(Duration::from_secs(12), now);
        playback.set_rate(0.5).unwrap();

        playback.load("https://example.com/next.mp3");
        assert_eq!(playback.url(), "https://example.com/next.mp3");
        assert_eq!(playback.current_time(), Duration::ZERO);
        assert!(!playback.is_playing());
        assert_eq!(playback.rate(), 0.5);
    }

    #[cfg(target_os = "linux")]
    mod external {
        use std::fs;
        use std::os::unix::fs::PermissionsExt;
        use std::path::PathBuf;

        use super::*;

        const CLIP: &str = "https://example.com/clip.mp3";

        /// A shell script standing in for mpv. It appends its arguments to a
        /// log file, then runs `tail` as the rest of the script.
        struct FakePlayer {
            script: PathBuf,
            log: PathBuf,
        }

        impl FakePlayer {
            fn new(tail: &str) -> Self {
                let dir = std::env::temp_dir();
                let id = uuid::Uuid::new_v4();
                let script = dir.join(format!("listening-quiz-player-{id}.sh"));
                let log = dir.join(format!("listening-quiz-player-{id}.log"));

                let body = format!("#!/bin/sh\necho \"$*\" >> '{}'\n{}\n", log.display(), tail);
                fs::write(&script, body).unwrap();
                fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
                Self { script, log }
            }

            fn playback(&self) -> Playback {
                Playback::new(CLIP, Some(self.script.display().to_string()))
            }

            /// Wait until `count` invocations are logged and return them.
            async fn invocations(&self, count: usize) -> Vec<String> {
                for _ in 0..250 {
                    let lines: Vec<String> = fs::read_to_string(&self.log)
                        .unwrap_or_default()
                        .lines()
                        .map(str::to_string)
                        .collect();
                    if lines.len() >= count {
                        return lines;
                    }
                    tokio::time::sleep(Duration::from_millis(20)).await;
                }
                panic!("player was not started {count} times");
            }
        }

        impl Drop for FakePlayer {
            fn drop(&mut self) {
                let _ = fs::remove_file(&self.script);
                let _ = fs::remove_file(&self.log);
            }
        }

        fn child_pid(playback: &Playback) -> u32 {
            playback
                .player
                .as_ref()
                .and_then(|player| player.child.as_ref())
                .and_then(|child| child.id())
                .unwrap()
        }

        /// True once `pid` has exited, whether or not it was reaped yet.
        async fn exited(pid: u32) -> bool {
            for _ in 0..250 {
                let state = fs::read_to_string(format!("/proc/{pid}/stat")).ok().and_then(|stat| {
                    stat.rsplit_once(')')
                        .and_then(|(_, rest)| rest.trim_start().chars().next())
                });
                match state {
                    None | Some('Z') | Some('X') => return true,
                    _ => tokio::time::sleep(Duration::from_millis(20)).await,
                }
            }
            false
        }

        async fn wait_until_stopped(playback: &mut Playback, now: Instant) {
            for _ in 0..250 {
                playback.poll_at(now);
                if !playback.is_playing() {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
            panic!("player never exited");
        }

        #[tokio::test]
        async fn test_player_started_at_offset_and_rate() {
            let fake = FakePlayer::new("exec sleep 30");
            let mut playback = fake.playback();
            let now = Instant::now();

            playback.seek_at(Duration::from_secs(12), now);
            playback.set_rate(2.0).unwrap();
            assert!(playback.player.as_ref().unwrap().child.is_none());

            playback.toggle_at(now);
            assert_eq!(
                fake.invocations(1).await,
                vec![format!("--no-video --start=12.00 --speed=2 {CLIP}")]
            );
        }

        #[tokio::test]
        async fn test_seek_and_rate_change_restart_player() {
            let fake = FakePlayer::new("exec sleep 30");
            let mut playback = fake.playback();
            let now = Instant::now();

            playback.toggle_at(now);
            fake.invocations(1).await;
            let first = child_pid(&playback);

            playback.seek_at(Duration::from_secs(30), now);
            fake.invocations(2).await;
            let second = child_pid(&playback);

            playback.set_rate_index(0, now);
            let lines = fake.invocations(3).await;

            assert_eq!(
                lines,
                vec![
                    format!("--no-video --start=0.00 --speed=1 {CLIP}"),
                    format!("--no-video --start=30.00 --speed=1 {CLIP}"),
                    format!("--no-video --start=30.00 --speed=0.25 {CLIP}"),
                ]
            );
            assert!(exited(first).await);
            assert!(exited(second).await);
            assert!(playback.is_playing());
        }

        #[tokio::test]
        async fn test_pause_and_drop_kill_player() {
            let fake = FakePlayer::new("exec sleep 30");
            let mut playback = fake.playback();
            let now = Instant::now();

            playback.toggle_at(now);
            fake.invocations(1).await;
            let paused = child_pid(&playback);
            playback.toggle_at(now + Duration::from_secs(2));
            assert!(exited(paused).await);

            playback.toggle_at(now + Duration::from_secs(2));
            let lines = fake.invocations(2).await;
            assert_eq!(lines[1], format!("--no-video --start=2.00 --speed=1 {CLIP}"));
            let dropped = child_pid(&playback);
            drop(playback);
            assert!(exited(dropped).await);
        }

        #[tokio::test]
        async fn test_clean_exit_fixes_duration() {
            let fake = FakePlayer::new("exit 0");
            let mut playback = fake.playback();
            let start = Instant::now();

            playback.toggle_at(start);
            wait_until_stopped(&mut playback, start + Duration::from_secs(7)).await;

            assert_eq!(playback.duration(), Some(Duration::from_secs(7)));
            assert_eq!(playback.current_time(), Duration::from_secs(7));

            playback.toggle_at(start + Duration::from_secs(8));
            let lines = fake.invocations(2).await;
            assert_eq!(lines[1], format!("--no-video --start=0.00 --speed=1 {CLIP}"));
        }

        #[tokio::test]
        async fn test_failed_player_stops_without_duration() {
            let fake = FakePlayer::new("exit 3");
            let mut playback = fake.playback();
            let start = Instant::now();

            playback.toggle_at(start);
            wait_until_stopped(&mut playback, start + Duration::from_secs(1)).await;

            assert_eq!(playback.duration(), None);
            assert_eq!(playback.current_time(), Duration::from_secs(1));
        }
    }
}
