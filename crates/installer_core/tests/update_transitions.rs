mod support;

use std::rc::Rc;

use installer_core::{
    update, Action, Effect, InstallEvent, InstallationState, LaunchError, LaunchFailureKind,
    Prompt, PromptKind,
};
use pretty_assertions::assert_eq;
use support::{init_logging, launch_config};

fn apply(state: &InstallationState, action: Action) -> InstallationState {
    update(state, &action).state.unwrap_or_else(|| state.clone())
}

fn busy_state() -> InstallationState {
    InstallationState {
        install_events: vec![InstallEvent::new("booting"), InstallEvent::new("ready")].into(),
        install_id: Some("install-0".to_string()),
        install_started: false,
        install_done: true,
        domain: Some("old.example.com".to_string()),
        dashboard_login_token: Some("token".to_string()),
        cert: Some("Y2VydA==".to_string()),
        install_error: Some("boom".to_string()),
    }
}

#[test]
fn launch_resets_every_field_and_requests_launch() {
    init_logging();
    for prior in [InstallationState::new(), busy_state()] {
        let transition = update(&prior, &Action::LaunchAws(launch_config()));
        let next = transition.state.expect("state changes");

        assert!(next.install_events.is_empty());
        assert_eq!(next.install_id, None);
        assert!(next.install_started);
        assert!(!next.install_done);
        assert_eq!(next.domain, None);
        assert_eq!(next.dashboard_login_token, None);
        assert_eq!(next.cert, None);
        assert_eq!(next.install_error, None);
        assert_eq!(
            transition.effects,
            vec![Effect::LaunchInstall(launch_config())]
        );
    }
}

#[test]
fn second_launch_while_running_is_rejected() {
    init_logging();
    let running = apply(&InstallationState::new(), Action::LaunchAws(launch_config()));
    let running = apply(
        &running,
        Action::LaunchInstallSuccess {
            install_id: "install-1".to_string(),
        },
    );

    let transition = update(&running, &Action::LaunchAws(launch_config()));

    assert_eq!(transition.state, None);
    assert!(transition.effects.is_empty());
}

#[test]
fn launch_success_records_id_and_opens_stream() {
    init_logging();
    let running = apply(&InstallationState::new(), Action::LaunchAws(launch_config()));
    let transition = update(
        &running,
        &Action::LaunchInstallSuccess {
            install_id: "install-1".to_string(),
        },
    );

    let next = transition.state.expect("state changes");
    assert_eq!(next.install_id.as_deref(), Some("install-1"));
    assert!(next.install_started);
    assert_eq!(
        transition.effects,
        vec![Effect::OpenEventStream("install-1".to_string())]
    );
}

#[test]
fn launch_failure_leaves_state_untouched() {
    init_logging();
    let running = apply(&InstallationState::new(), Action::LaunchAws(launch_config()));
    let err = LaunchError::new(LaunchFailureKind::HttpStatus(500), "internal error");

    let transition = update(&running, &Action::LaunchInstallFailure(err.clone()));

    assert_eq!(transition.state, None);
    assert_eq!(transition.effects, vec![Effect::ReportLaunchFailure(err)]);
}

#[test]
fn install_events_append_in_dispatch_order() {
    init_logging();
    let mut state = InstallationState::new();
    let descriptions: Vec<String> = (0..5).map(|i| format!("step {i}")).collect();

    for description in &descriptions {
        let before = state.install_events.clone();
        state = apply(&state, Action::InstallEvent(InstallEvent::new(description)));
        assert_eq!(&state.install_events[..before.len()], &before[..]);
    }

    let seen: Vec<&str> = state
        .install_events
        .iter()
        .map(|event| event.description.as_str())
        .collect();
    assert_eq!(seen, descriptions);
}

#[test]
fn appending_an_event_keeps_previous_snapshot_intact() {
    init_logging();
    let first = apply(
        &InstallationState::new(),
        Action::InstallEvent(InstallEvent::new("booting")),
    );
    let second = apply(&first, Action::InstallEvent(InstallEvent::new("ready")));

    assert_eq!(first.install_events.len(), 1);
    assert_eq!(second.install_events.len(), 2);
    assert!(!Rc::ptr_eq(&first.install_events, &second.install_events));

    let third = apply(&second, Action::Domain("example.com".to_string()));
    assert!(Rc::ptr_eq(&second.install_events, &third.install_events));
}

#[test]
fn install_done_clears_started_regardless_of_events() {
    init_logging();
    for event_count in [0, 1, 7] {
        let mut state = apply(&InstallationState::new(), Action::LaunchAws(launch_config()));
        for i in 0..event_count {
            state = apply(&state, Action::InstallEvent(InstallEvent::new(format!("{i}"))));
        }
        let next = apply(&state, Action::InstallDone);
        assert!(next.install_done);
        assert!(!next.install_started);
        assert_eq!(next.install_events.len(), event_count);
    }
}

#[test]
fn install_done_closes_the_stream_of_the_active_install() {
    init_logging();
    let state = InstallationState {
        install_id: Some("install-1".to_string()),
        install_started: true,
        ..InstallationState::new()
    };

    let transition = update(&state, &Action::InstallDone);

    assert_eq!(
        transition.effects,
        vec![Effect::CloseEventStream("install-1".to_string())]
    );
}

#[test]
fn single_field_actions_touch_only_their_field() {
    init_logging();
    let prior = busy_state();

    let next = apply(&prior, Action::Domain("example.com".to_string()));
    assert_eq!(
        next,
        InstallationState {
            domain: Some("example.com".to_string()),
            ..prior.clone()
        }
    );

    let next = apply(&prior, Action::DashboardLoginToken("abc123".to_string()));
    assert_eq!(
        next,
        InstallationState {
            dashboard_login_token: Some("abc123".to_string()),
            ..prior.clone()
        }
    );

    let next = apply(&prior, Action::CaCert("bmV3LWNlcnQ=".to_string()));
    assert_eq!(
        next,
        InstallationState {
            cert: Some("bmV3LWNlcnQ=".to_string()),
            ..prior.clone()
        }
    );
}

#[test]
fn prompt_is_routed_as_effect_without_state_change() {
    init_logging();
    let state = InstallationState {
        install_id: Some("install-1".to_string()),
        install_started: true,
        ..InstallationState::new()
    };
    let prompt = Prompt {
        kind: PromptKind::YesNo,
        message: "Proceed?".to_string(),
    };

    let transition = update(&state, &Action::InstallPromptRequested(prompt.clone()));

    assert_eq!(transition.state, None);
    assert_eq!(
        transition.effects,
        vec![Effect::RequestPrompt {
            install_id: "install-1".to_string(),
            prompt,
        }]
    );
}

#[test]
fn prompt_without_install_is_dropped() {
    init_logging();
    let transition = update(
        &InstallationState::new(),
        &Action::InstallPromptRequested(Prompt {
            kind: PromptKind::Text,
            message: "Name?".to_string(),
        }),
    );

    assert_eq!(transition.state, None);
    assert!(transition.effects.is_empty());
}

#[test]
fn install_failure_is_terminal() {
    init_logging();
    let state = InstallationState {
        install_id: Some("install-1".to_string()),
        install_started: true,
        ..InstallationState::new()
    };

    let transition = update(
        &state,
        &Action::InstallFailed {
            message: "stack creation failed".to_string(),
        },
    );

    let next = transition.state.expect("state changes");
    assert!(!next.install_started);
    assert!(!next.install_done);
    assert_eq!(next.install_error.as_deref(), Some("stack creation failed"));
    assert_eq!(
        transition.effects,
        vec![Effect::CloseEventStream("install-1".to_string())]
    );
    assert!(next.is_idle());
}
