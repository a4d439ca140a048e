use std::sync::Mutex;
use std::time::{Duration, Instant};

/// 上游请求的准入能力
///
/// 处理器只依赖这个能力，便于替换为按键或令牌桶等其他策略。
pub trait AdmissionControl: Send + Sync {
    /// 返回 true 表示放行本次上游请求
    fn try_admit(&self) -> bool;
}

/// 进程级最小间隔节流器
///
/// 任意两次被放行的上游请求之间至少间隔 `min_interval`，对所有并发
/// 调用方全局生效。锁只保护时间戳的比较和更新，绝不跨 I/O 持有。
pub struct MinIntervalThrottle {
    min_interval: Duration,
    last_admitted: Mutex<Option<Instant>>,
}

impl MinIntervalThrottle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_admitted: Mutex::new(None),
        }
    }
}

impl AdmissionControl for MinIntervalThrottle {
    fn try_admit(&self) -> bool {
        let mut last_admitted = match self.last_admitted.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(last) = *last_admitted {
            if last.elapsed() < self.min_interval {
                // 拒绝时不更新时间戳
                return false;
            }
        }

        *last_admitted = Some(Instant::now());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Barrier};
    use std::thread;

    #[test]
    fn first_attempt_is_admitted() {
        let throttle = MinIntervalThrottle::new(Duration::from_secs(1));
        assert!(throttle.try_admit());
    }

    #[test]
    fn second_attempt_within_interval_is_rejected() {
        let throttle = MinIntervalThrottle::new(Duration::from_secs(1));
        assert!(throttle.try_admit());
        assert!(!throttle.try_admit());
    }

    #[test]
    fn attempt_after_interval_is_admitted() {
        let throttle = MinIntervalThrottle::new(Duration::from_millis(50));
        assert!(throttle.try_admit());
        thread::sleep(Duration::from_millis(60));
        assert!(throttle.try_admit());
    }

    #[test]
    fn rejection_does_not_reset_the_interval() {
        let throttle = MinIntervalThrottle::new(Duration::from_millis(100));
        assert!(throttle.try_admit());
        thread::sleep(Duration::from_millis(60));
        assert!(!throttle.try_admit());
        // 距首次放行超过间隔后必须放行，即使中间有一次被拒绝
        thread::sleep(Duration::from_millis(50));
        assert!(throttle.try_admit());
    }

    #[test]
    fn exactly_one_of_two_simultaneous_attempts_is_admitted() {
        let throttle = Arc::new(MinIntervalThrottle::new(Duration::from_secs(1)));
        let barrier = Arc::new(Barrier::new(2));

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let throttle = Arc::clone(&throttle);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    throttle.try_admit()
                })
            })
            .collect();

        let admitted = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .filter(|&admitted| admitted)
            .count();
        assert_eq!(admitted, 1);
    }
}
