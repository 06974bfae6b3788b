//! Shared frame loop scenarios
//!
//! Loop start/stop, clock behaviour and per-scene fault isolation.

use super::{frame, headless_runtime, headless_runtime_with};
use crate::args;
use crate::config::RuntimeConfig;
use crate::foundation::math::Vec3;
use crate::node::Value;

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_shared_loop_lifecycle() {
        let (runtime, signal, draws) = headless_runtime();
        let a = runtime.scene();
        let b = runtime.scene();
        a.add(&[runtime.entity("box", &[]).expect("box")]);
        b.add(&[runtime.entity("sphere", &[]).expect("sphere")]);

        a.render(None).expect("render a");
        b.render(None).expect("render b");
        assert!(runtime.is_looping());
        assert_eq!(signal.total_requests(), 1);
        assert_eq!(runtime.active_scenes(), vec![a.id(), b.id()]);

        assert!(frame(&runtime, &signal, 0));
        assert_eq!(draws.scene_order(), vec![a.id(), b.id()]);
        assert_eq!(signal.pending(), 1);

        a.stop();
        assert!(frame(&runtime, &signal, 16));
        assert_eq!(draws.scene_order(), vec![a.id(), b.id(), b.id()]);

        b.stop();
        assert!(frame(&runtime, &signal, 32));
        assert_eq!(draws.draw_count(), 3);
        assert!(!runtime.is_looping());
        assert_eq!(signal.pending(), 0);
        assert!(!frame(&runtime, &signal, 48));
    }

    #[test]
    fn test_render_is_idempotent() {
        let (runtime, signal, draws) = headless_runtime();
        let scene = runtime.scene();
        scene.add(&[runtime.entity("box", &[]).expect("box")]);

        scene.render(None).expect("first render");
        scene.render(None).expect("second render");
        assert_eq!(runtime.active_scenes().len(), 1);
        assert_eq!(signal.total_requests(), 1);

        assert!(frame(&runtime, &signal, 0));
        assert_eq!(draws.draws_of(scene.id()), 1);
    }

    #[test]
    fn test_restart_while_running_does_not_request_twice() {
        let (runtime, signal, _) = headless_runtime();
        let scene = runtime.scene();
        scene.render(None).expect("render");
        scene.stop();
        scene.render(None).expect("render again");

        assert!(runtime.is_looping());
        assert_eq!(signal.total_requests(), 1);
    }

    #[test]
    fn test_drift_through_frames() {
        let (runtime, signal, draws) = headless_runtime();
        let scene = runtime.scene();
        let node = runtime
            .entity("box", &[])
            .expect("box")
            .translate(&args![0, 0, 0, 1])
            .expect("valid translate");
        scene.add(&[node]);
        scene.render(None).expect("render");

        frame(&runtime, &signal, 1000);
        frame(&runtime, &signal, 1500);
        frame(&runtime, &signal, 3000);

        assert_relative_eq!(runtime.time(), 2.0);
        let last = draws.last_draw_of(scene.id()).expect("drawn");
        assert_relative_eq!(last.objects[0].pose.position, Vec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn test_clock_pauses_while_idle() {
        let (runtime, signal, _) = headless_runtime();
        let scene = runtime.scene();
        scene.render(None).expect("render");

        frame(&runtime, &signal, 0);
        frame(&runtime, &signal, 1000);
        assert_relative_eq!(runtime.time(), 1.0);

        scene.stop();
        frame(&runtime, &signal, 2000);
        assert!(!runtime.is_looping());
        assert_relative_eq!(runtime.time(), 1.0);

        scene.render(None).expect("resume");
        frame(&runtime, &signal, 10_000);
        assert_relative_eq!(runtime.time(), 1.0);
        frame(&runtime, &signal, 10_500);
        assert_relative_eq!(runtime.time(), 1.5);
    }

    #[test]
    fn test_failing_scene_does_not_stop_others() {
        let (runtime, signal, draws) = headless_runtime();
        let broken = runtime.scene();
        let healthy = runtime.scene();

        let flaky = runtime
            .entity("box", &[])
            .expect("box")
            .translate(&[Value::try_dynamic(|frame| {
                if frame.time > 0.5 {
                    Err("sensor offline".into())
                } else {
                    Ok(frame.time)
                }
            })])
            .expect("valid translate");
        broken.add(&[flaky]);
        healthy.add(&[runtime.entity("sphere", &[]).expect("sphere")]);
        broken.render(None).expect("render broken");
        healthy.render(None).expect("render healthy");

        frame(&runtime, &signal, 0);
        frame(&runtime, &signal, 1000);
        frame(&runtime, &signal, 2000);

        assert_eq!(draws.draws_of(broken.id()), 1);
        assert_eq!(draws.draws_of(healthy.id()), 3);
        assert!(runtime.is_looping());
        assert_eq!(signal.pending(), 1);

        let faults = runtime.take_faults();
        assert_eq!(faults.len(), 2);
        assert!(faults.iter().all(|f| f.scene == broken.id()));
        assert!(faults[0].message.contains("sensor offline"));
        assert_relative_eq!(faults[1].time, 2.0);
        assert!(runtime.take_faults().is_empty());
    }

    #[test]
    fn test_shared_failure_faults_every_scene_in_either_order() {
        for child_first in [false, true] {
            let (runtime, signal, draws) = headless_runtime();
            let flaky = runtime
                .entity("box", &[])
                .expect("box")
                .translate(&[Value::try_dynamic(|frame| {
                    if frame.time > 0.5 {
                        Err("sensor offline".into())
                    } else {
                        Ok(frame.time)
                    }
                })])
                .expect("valid translate");
            let doubled = flaky.scale(&args![2]).expect("valid scale");

            let parent_scene = runtime.scene();
            let child_scene = runtime.scene();
            parent_scene.add(&[flaky]);
            child_scene.add(&[doubled]);
            if child_first {
                child_scene.render(None).expect("render child");
                parent_scene.render(None).expect("render parent");
            } else {
                parent_scene.render(None).expect("render parent");
                child_scene.render(None).expect("render child");
            }

            frame(&runtime, &signal, 0);
            frame(&runtime, &signal, 1000);

            assert_eq!(draws.draws_of(parent_scene.id()), 1);
            assert_eq!(draws.draws_of(child_scene.id()), 1);
            let faults = runtime.take_faults();
            assert_eq!(faults.len(), 2);
            for scene in [parent_scene.id(), child_scene.id()] {
                assert!(faults.iter().any(|f| f.scene == scene && f.time == 1.0));
            }
        }
    }

    #[test]
    fn test_panicking_argument_is_a_fault() {
        let (runtime, signal, draws) = headless_runtime();
        let broken = runtime.scene();
        let healthy = runtime.scene();

        let node = runtime
            .entity("box", &[])
            .expect("box")
            .scale(&[Value::dynamic(|_| panic!("kaboom"))])
            .expect("valid scale");
        broken.add(&[node]);
        broken.render(None).expect("render broken");
        healthy.render(None).expect("render healthy");

        frame(&runtime, &signal, 0);

        assert_eq!(draws.draws_of(broken.id()), 0);
        assert_eq!(draws.draws_of(healthy.id()), 1);
        let faults = runtime.take_faults();
        assert_eq!(faults.len(), 1);
        assert!(faults[0].message.contains("kaboom"));
        assert!(runtime.is_looping());
    }

    #[test]
    fn test_backend_failure_is_a_fault() {
        let (runtime, signal, draws) = headless_runtime();
        let a = runtime.scene();
        let b = runtime.scene();
        a.render(None).expect("render a");
        b.render(None).expect("render b");
        draws.fail_draws_of(a.id());

        frame(&runtime, &signal, 0);

        assert_eq!(draws.scene_order(), vec![b.id()]);
        let faults = runtime.take_faults();
        assert_eq!(faults.len(), 1);
        assert_eq!(faults[0].scene, a.id());
        assert!(faults[0].message.contains("Rendering failed"));
    }

    #[test]
    fn test_fault_retention_is_bounded() {
        let config = RuntimeConfig {
            max_retained_faults: 2,
            ..RuntimeConfig::default()
        };
        let (runtime, signal, draws) = headless_runtime_with(config);
        let scene = runtime.scene();
        scene.render(None).expect("render");
        draws.fail_draws_of(scene.id());

        for step in 0..5 {
            frame(&runtime, &signal, step * 1000);
        }

        let times: Vec<f64> = runtime.take_faults().iter().map(|f| f.time).collect();
        assert_eq!(times, vec![3.0, 4.0]);
    }

    #[test]
    fn test_scene_can_stop_itself_mid_frame() {
        let (runtime, signal, draws) = headless_runtime();
        let scene = runtime.scene();
        let handle = scene.clone();
        let node = runtime
            .entity("box", &[])
            .expect("box")
            .translate(&[Value::dynamic(move |frame| {
                if frame.time >= 1.0 {
                    handle.stop();
                }
                0.0
            })])
            .expect("valid translate");
        scene.add(&[node]);
        scene.render(None).expect("render");

        frame(&runtime, &signal, 0);
        frame(&runtime, &signal, 1000);

        // Drawn on the frame that stopped it, then the loop winds down.
        assert_eq!(draws.draws_of(scene.id()), 2);
        assert!(!scene.is_rendering());
        assert!(!runtime.is_looping());
        assert_eq!(signal.pending(), 0);
    }

    #[test]
    fn test_shared_node_evaluated_once_per_frame() {
        let (runtime, signal, draws) = headless_runtime();
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let node = runtime
            .entity("box", &[])
            .expect("box")
            .translate(&[Value::dynamic(move |frame| {
                counter.set(counter.get() + 1);
                frame.time
            })])
            .expect("valid translate");

        let a = runtime.scene();
        let b = runtime.scene();
        a.add(&[node.clone(), node.clone()]);
        b.add(&[node]);
        a.render(None).expect("render a");
        b.render(None).expect("render b");

        frame(&runtime, &signal, 0);
        frame(&runtime, &signal, 250);

        assert_eq!(calls.get(), 2);
        let last = draws.last_draw_of(a.id()).expect("drawn");
        assert_eq!(last.objects.len(), 2);
        assert_eq!(last.objects[0], last.objects[1]);
        assert_relative_eq!(last.objects[0].pose.position.x, 0.25);
    }
}
