use shiftboard_db::models::Decision;
use shiftboard_services::DaoError;

use crate::fixtures::seed::{HEADERS, seed_tenant};
use crate::fixtures::test_app::{ACTOR, TestCore};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_cell_edits_are_all_applied() {
    let core = TestCore::new();
    let tenant_id = seed_tenant(&core.state, "acme").await;

    let mut handles = Vec::new();
    for employee in ["E1", "E2", "E3"] {
        for index in 0..HEADERS.len() {
            let state = core.state.clone();
            handles.push(tokio::spawn(async move {
                state
                    .roster
                    .update_cell(tenant_id, employee, index, "HL", ACTOR)
                    .await
            }));
        }
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let display = core.state.roster.display(tenant_id).await.unwrap();
    for employee in display.employees() {
        assert!(employee.schedule().iter().all(|c| c == "HL"), "{employee:?}");
    }
    // Every cell differed from the import
    assert_eq!(core.state.roster.modifications(tenant_id).await.unwrap().len(), 9);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn readers_never_see_a_half_applied_swap() {
    let core = TestCore::new();
    let tenant_id = seed_tenant(&core.state, "acme").await;

    let mut swaps = Vec::new();
    for date in HEADERS {
        let swap = core
            .state
            .requests
            .submit_swap_request(tenant_id, "E1", "E3", date, "")
            .await
            .unwrap();
        swaps.push(swap.id);
    }

    let reader_state = core.state.clone();
    let reader = tokio::spawn(async move {
        for _ in 0..200 {
            let display = reader_state.roster.display(tenant_id).await.unwrap();
            // Alice and Carol hold D+N+"" and D+D+D before; after each swap
            // the multiset of their two cells on that date is unchanged
            for (i, pair) in [("D", "D"), ("N", "D"), ("", "D")].iter().enumerate() {
                let mut seen = [
                    display.shift("E1", i).unwrap_or_default(),
                    display.shift("E3", i).unwrap_or_default(),
                ];
                seen.sort();
                let mut expected = [pair.0, pair.1];
                expected.sort();
                assert_eq!(seen, expected);
            }
            tokio::task::yield_now().await;
        }
    });

    let mut deciders = Vec::new();
    for id in swaps {
        let state = core.state.clone();
        deciders.push(tokio::spawn(async move {
            state
                .requests
                .decide(tenant_id, &id, Decision::Approve, ACTOR, None)
                .await
        }));
    }
    for decider in deciders {
        decider.await.unwrap().unwrap();
    }
    reader.await.unwrap();

    let counts = core.state.requests.counts(tenant_id).await.unwrap();
    assert_eq!(counts.approved, 3);
    assert_eq!(counts.pending, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn only_one_decision_wins() {
    let core = TestCore::new();
    let tenant_id = seed_tenant(&core.state, "acme").await;
    let request = core
        .state
        .requests
        .submit_change_request(tenant_id, "E2", "1Jan", "SL", "")
        .await
        .unwrap();

    let mut handles = Vec::new();
    for decision in [Decision::Approve, Decision::Reject, Decision::Approve, Decision::Reject] {
        let state = core.state.clone();
        let id = request.id.clone();
        handles.push(tokio::spawn(async move {
            state
                .requests
                .decide(tenant_id, &id, decision, ACTOR, None)
                .await
        }));
    }

    let mut won = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => won += 1,
            Err(DaoError::InvalidState(_)) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(won, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_signups_cannot_share_a_slug() {
    let core = TestCore::new();

    let mut handles = Vec::new();
    for n in 0..8 {
        let state = core.state.clone();
        handles.push(tokio::spawn(async move {
            state
                .tenants
                .create(format!("Acme {n}"), "acme".to_string(), None)
                .await
        }));
    }

    let mut created = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            created += 1;
        }
    }
    assert_eq!(created, 1);
    assert_eq!(core.state.tenants.list().await.unwrap().len(), 1);
}
