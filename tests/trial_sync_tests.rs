//! Integration tests for the trial-status synchronizer.

mod test_utils;

use anyhow::Result;
use sea_orm::EntityTrait;
use uuid::Uuid;

use payesmart::models::{business, saas_client};
use payesmart::repositories::SaasClientRepository;
use payesmart::trial_sync::{
    ProvisionOutcome, RecordOutcome, SkipReason, SubscriptionCheck, SyncError, TrialSynchronizer,
};

use test_utils::{
    BusinessFixture, ClientFixture, insert_business, insert_client, insert_subscription,
    insert_trial_period, setup_test_db,
};

const DAY_MILLIS: i64 = 24 * 60 * 60 * 1000;

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[tokio::test]
async fn business_in_trial_without_client_gets_one_created_with_mirrored_window() -> Result<()> {
    let db = setup_test_db().await?;
    let business = insert_business(
        &db,
        BusinessFixture {
            email: "a@x.com".to_string(),
            is_in_trial: true,
            trial_start_date: Some(1000),
            trial_end_date: Some(2000),
            ..Default::default()
        },
    )
    .await?;

    let report = TrialSynchronizer::new(&db).synchronize_trial_status().await?;

    assert_eq!(report.businesses_to_clients.created(), 1);
    assert_eq!(report.total_failed(), 0);

    let clients = saas_client::Entity::find().all(&db).await?;
    assert_eq!(clients.len(), 1);

    let client = &clients[0];
    assert_eq!(client.business_id, Some(business.id));
    assert_eq!(client.email, "a@x.com");
    assert!(client.is_in_trial);
    assert_eq!(client.trial_start_date, Some(1000));
    assert_eq!(client.trial_end_date, Some(2000));
    Ok(())
}

#[tokio::test]
async fn client_in_trial_pushes_window_onto_linked_business() -> Result<()> {
    let db = setup_test_db().await?;
    let business = insert_business(&db, BusinessFixture::default()).await?;
    insert_client(
        &db,
        ClientFixture {
            business_id: Some(business.id),
            email: business.email.clone(),
            is_in_trial: true,
            trial_start_date: Some(5000),
            trial_end_date: Some(9000),
            ..Default::default()
        },
    )
    .await?;

    let report = TrialSynchronizer::new(&db).synchronize_trial_status().await?;
    assert_eq!(report.clients_to_businesses.updated(), 1);

    let refreshed = business::Entity::find_by_id(business.id)
        .one(&db)
        .await?
        .unwrap();
    assert!(refreshed.is_in_trial);
    assert_eq!(refreshed.trial_start_date, Some(5000));
    assert_eq!(refreshed.trial_end_date, Some(9000));
    Ok(())
}

#[tokio::test]
async fn client_in_trial_without_dates_applies_fifteen_day_fallback() -> Result<()> {
    let db = setup_test_db().await?;
    let business = insert_business(&db, BusinessFixture::default()).await?;
    insert_client(
        &db,
        ClientFixture {
            business_id: Some(business.id),
            email: business.email.clone(),
            is_in_trial: true,
            trial_start_date: None,
            trial_end_date: None,
            ..Default::default()
        },
    )
    .await?;

    let before = now_millis();
    TrialSynchronizer::new(&db).synchronize_trial_status().await?;
    let after = now_millis();

    let refreshed = business::Entity::find_by_id(business.id)
        .one(&db)
        .await?
        .unwrap();
    let start = refreshed.trial_start_date.unwrap();
    let end = refreshed.trial_end_date.unwrap();
    assert!(start >= before && start <= after);
    assert_eq!(end - start, 15 * DAY_MILLIS);
    Ok(())
}

#[tokio::test]
async fn fallback_window_is_written_back_to_client_and_stays_stable() -> Result<()> {
    let db = setup_test_db().await?;
    let business = insert_business(&db, BusinessFixture::default()).await?;
    let client = insert_client(
        &db,
        ClientFixture {
            business_id: Some(business.id),
            email: business.email.clone(),
            is_in_trial: true,
            trial_start_date: None,
            trial_end_date: None,
            ..Default::default()
        },
    )
    .await?;

    let synchronizer = TrialSynchronizer::new(&db);
    let first = synchronizer.synchronize_trial_status().await?;
    assert_eq!(first.clients_to_businesses.updated(), 1);

    let refreshed_client = saas_client::Entity::find_by_id(client.id)
        .one(&db)
        .await?
        .unwrap();
    let refreshed_business = business::Entity::find_by_id(business.id)
        .one(&db)
        .await?
        .unwrap();
    assert_eq!(
        refreshed_client.trial_start_date,
        refreshed_business.trial_start_date
    );
    assert_eq!(
        refreshed_client.trial_end_date,
        refreshed_business.trial_end_date
    );

    let second = synchronizer.synchronize_trial_status().await?;
    assert_eq!(second.clients_to_businesses.updated(), 0);
    assert_eq!(second.total_failed(), 0);

    let settled = business::Entity::find_by_id(business.id)
        .one(&db)
        .await?
        .unwrap();
    assert_eq!(settled.trial_start_date, refreshed_business.trial_start_date);
    assert_eq!(settled.trial_end_date, refreshed_business.trial_end_date);
    Ok(())
}

#[tokio::test]
async fn client_without_business_link_is_skipped() -> Result<()> {
    let db = setup_test_db().await?;
    let client = insert_client(
        &db,
        ClientFixture {
            business_id: None,
            is_in_trial: true,
            trial_start_date: Some(1000),
            trial_end_date: Some(2000),
            ..Default::default()
        },
    )
    .await?;

    let report = TrialSynchronizer::new(&db).synchronize_trial_status().await?;

    assert_eq!(
        report
            .clients_to_businesses
            .skipped_with(SkipReason::MissingBusinessId),
        1
    );
    assert!(report.clients_to_businesses.outcomes.contains(
        &RecordOutcome::Skipped {
            id: client.id,
            reason: SkipReason::MissingBusinessId,
        }
    ));
    assert_eq!(report.total_failed(), 0);
    Ok(())
}

#[tokio::test]
async fn client_referencing_missing_business_counts_as_failure() -> Result<()> {
    let db = setup_test_db().await?;
    insert_client(
        &db,
        ClientFixture {
            business_id: Some(Uuid::new_v4()),
            is_in_trial: true,
            trial_start_date: Some(1000),
            trial_end_date: Some(2000),
            ..Default::default()
        },
    )
    .await?;

    let report = TrialSynchronizer::new(&db).synchronize_trial_status().await?;
    assert_eq!(report.clients_to_businesses.failed(), 1);
    Ok(())
}

#[tokio::test]
async fn business_in_trial_reflags_existing_client_with_business_window() -> Result<()> {
    let db = setup_test_db().await?;
    let business = insert_business(
        &db,
        BusinessFixture {
            is_in_trial: true,
            trial_start_date: Some(3000),
            trial_end_date: Some(7000),
            ..Default::default()
        },
    )
    .await?;
    let client = insert_client(
        &db,
        ClientFixture {
            business_id: Some(business.id),
            email: business.email.clone(),
            is_in_trial: false,
            trial_start_date: None,
            trial_end_date: None,
            ..Default::default()
        },
    )
    .await?;

    let report = TrialSynchronizer::new(&db).synchronize_trial_status().await?;
    assert_eq!(report.businesses_to_clients.updated(), 1);

    let refreshed = saas_client::Entity::find_by_id(client.id)
        .one(&db)
        .await?
        .unwrap();
    assert!(refreshed.is_in_trial);
    assert_eq!(refreshed.trial_start_date, Some(3000));
    assert_eq!(refreshed.trial_end_date, Some(7000));
    Ok(())
}

#[tokio::test]
async fn client_already_in_trial_stays_authoritative() -> Result<()> {
    let db = setup_test_db().await?;
    let business = insert_business(
        &db,
        BusinessFixture {
            is_in_trial: true,
            trial_start_date: Some(100),
            trial_end_date: Some(200),
            ..Default::default()
        },
    )
    .await?;
    let client = insert_client(
        &db,
        ClientFixture {
            business_id: Some(business.id),
            email: business.email.clone(),
            is_in_trial: true,
            trial_start_date: Some(5000),
            trial_end_date: Some(9000),
            ..Default::default()
        },
    )
    .await?;

    TrialSynchronizer::new(&db).synchronize_trial_status().await?;

    // The client window wins and is mirrored onto the business, never the
    // other way around.
    let refreshed_client = saas_client::Entity::find_by_id(client.id)
        .one(&db)
        .await?
        .unwrap();
    assert_eq!(refreshed_client.trial_start_date, Some(5000));
    assert_eq!(refreshed_client.trial_end_date, Some(9000));

    let refreshed_business = business::Entity::find_by_id(business.id)
        .one(&db)
        .await?
        .unwrap();
    assert_eq!(refreshed_business.trial_start_date, Some(5000));
    assert_eq!(refreshed_business.trial_end_date, Some(9000));
    Ok(())
}

#[tokio::test]
async fn current_subscription_clears_trial_on_both_registries() -> Result<()> {
    let db = setup_test_db().await?;
    let business = insert_business(
        &db,
        BusinessFixture {
            is_in_trial: true,
            trial_start_date: Some(1000),
            trial_end_date: Some(now_millis() + DAY_MILLIS),
            ..Default::default()
        },
    )
    .await?;
    let client = insert_client(
        &db,
        ClientFixture {
            business_id: Some(business.id),
            email: business.email.clone(),
            is_in_trial: true,
            trial_start_date: Some(1000),
            trial_end_date: Some(now_millis() + DAY_MILLIS),
            ..Default::default()
        },
    )
    .await?;
    insert_subscription(&db, business.id, "active", now_millis() + 30 * DAY_MILLIS).await?;

    let report = TrialSynchronizer::new(&db)
        .clear_trials_for_active_subscriptions()
        .await?;
    assert_eq!(report.updated(), 1);

    let refreshed_business = business::Entity::find_by_id(business.id)
        .one(&db)
        .await?
        .unwrap();
    assert!(!refreshed_business.is_in_trial);

    let refreshed_client = saas_client::Entity::find_by_id(client.id)
        .one(&db)
        .await?
        .unwrap();
    assert!(!refreshed_client.is_in_trial);
    Ok(())
}

#[tokio::test]
async fn expired_active_subscription_leaves_trial_untouched() -> Result<()> {
    let db = setup_test_db().await?;
    let business = insert_business(
        &db,
        BusinessFixture {
            is_in_trial: true,
            trial_start_date: Some(1000),
            trial_end_date: Some(now_millis() + DAY_MILLIS),
            ..Default::default()
        },
    )
    .await?;
    insert_subscription(&db, business.id, "active", now_millis() - 1000).await?;

    let report = TrialSynchronizer::new(&db)
        .clear_trials_for_active_subscriptions()
        .await?;
    assert_eq!(report.updated(), 0);
    assert_eq!(report.skipped_with(SkipReason::SubscriptionExpired), 1);

    let refreshed = business::Entity::find_by_id(business.id)
        .one(&db)
        .await?
        .unwrap();
    assert!(refreshed.is_in_trial);
    Ok(())
}

#[tokio::test]
async fn non_active_subscription_is_ignored_by_batch_pass() -> Result<()> {
    let db = setup_test_db().await?;
    let business = insert_business(
        &db,
        BusinessFixture {
            is_in_trial: true,
            trial_start_date: Some(1000),
            trial_end_date: Some(now_millis() + DAY_MILLIS),
            ..Default::default()
        },
    )
    .await?;
    insert_subscription(&db, business.id, "cancelled", now_millis() + 30 * DAY_MILLIS).await?;

    let report = TrialSynchronizer::new(&db)
        .clear_trials_for_active_subscriptions()
        .await?;
    assert!(report.outcomes.is_empty());

    let refreshed = business::Entity::find_by_id(business.id)
        .one(&db)
        .await?
        .unwrap();
    assert!(refreshed.is_in_trial);
    Ok(())
}

#[tokio::test]
async fn second_run_makes_no_further_changes() -> Result<()> {
    let db = setup_test_db().await?;
    let business = insert_business(
        &db,
        BusinessFixture {
            is_in_trial: true,
            trial_start_date: Some(1000),
            trial_end_date: Some(2000),
            ..Default::default()
        },
    )
    .await?;
    insert_client(
        &db,
        ClientFixture {
            business_id: Some(business.id),
            email: business.email.clone(),
            is_in_trial: true,
            trial_start_date: Some(5000),
            trial_end_date: Some(9000),
            ..Default::default()
        },
    )
    .await?;

    let synchronizer = TrialSynchronizer::new(&db);
    let first = synchronizer.synchronize_trial_status().await?;
    assert_eq!(first.clients_to_businesses.updated(), 1);

    let second = synchronizer.synchronize_trial_status().await?;
    assert_eq!(second.clients_to_businesses.updated(), 0);
    assert_eq!(second.businesses_to_clients.created(), 0);
    assert_eq!(second.businesses_to_clients.updated(), 0);
    assert_eq!(second.subscription_overrides.updated(), 0);
    assert_eq!(second.total_failed(), 0);
    Ok(())
}

#[tokio::test]
async fn subscription_check_clears_trial_for_single_tenant() -> Result<()> {
    let db = setup_test_db().await?;
    let business = insert_business(
        &db,
        BusinessFixture {
            is_in_trial: true,
            trial_start_date: Some(1000),
            trial_end_date: Some(2000),
            ..Default::default()
        },
    )
    .await?;
    let client = insert_client(
        &db,
        ClientFixture {
            business_id: Some(business.id),
            email: business.email.clone(),
            is_in_trial: true,
            ..Default::default()
        },
    )
    .await?;
    insert_subscription(&db, business.id, "active", now_millis() + 30 * DAY_MILLIS).await?;

    let outcome = TrialSynchronizer::new(&db)
        .check_subscription_for_client(business.id)
        .await?;
    assert_eq!(outcome, SubscriptionCheck::TrialCleared);

    let refreshed_business = business::Entity::find_by_id(business.id)
        .one(&db)
        .await?
        .unwrap();
    assert!(!refreshed_business.is_in_trial);

    let refreshed_client = saas_client::Entity::find_by_id(client.id)
        .one(&db)
        .await?
        .unwrap();
    assert!(!refreshed_client.is_in_trial);
    Ok(())
}

#[tokio::test]
async fn subscription_check_without_active_subscription_changes_nothing() -> Result<()> {
    let db = setup_test_db().await?;
    let business = insert_business(
        &db,
        BusinessFixture {
            is_in_trial: true,
            trial_start_date: Some(1000),
            trial_end_date: Some(2000),
            ..Default::default()
        },
    )
    .await?;
    insert_subscription(&db, business.id, "cancelled", now_millis() + DAY_MILLIS).await?;

    let outcome = TrialSynchronizer::new(&db)
        .check_subscription_for_client(business.id)
        .await?;
    assert_eq!(outcome, SubscriptionCheck::NoActiveSubscription);

    let refreshed = business::Entity::find_by_id(business.id)
        .one(&db)
        .await?
        .unwrap();
    assert!(refreshed.is_in_trial);
    Ok(())
}

#[tokio::test]
async fn subscription_check_for_unknown_tenant_fails() -> Result<()> {
    let db = setup_test_db().await?;
    let missing = Uuid::new_v4();

    let result = TrialSynchronizer::new(&db)
        .check_subscription_for_client(missing)
        .await;
    assert!(matches!(result, Err(SyncError::BusinessNotFound(id)) if id == missing));
    Ok(())
}

#[tokio::test]
async fn provisioning_applies_configured_trial_period() -> Result<()> {
    let db = setup_test_db().await?;
    insert_trial_period(&db, "One week", 7, 0, true).await?;
    let business = insert_business(&db, BusinessFixture::default()).await?;

    let before = now_millis();
    let outcome = TrialSynchronizer::new(&db)
        .provision_client_for_business(business.id)
        .await?;
    let after = now_millis();

    let ProvisionOutcome::Created { client_id } = outcome else {
        panic!("expected a created client, got {:?}", outcome);
    };

    let client = saas_client::Entity::find_by_id(client_id)
        .one(&db)
        .await?
        .unwrap();
    assert!(client.is_in_trial);
    assert_eq!(client.business_id, Some(business.id));

    let start = client.trial_start_date.unwrap();
    let end = client.trial_end_date.unwrap();
    assert!(start >= before && start <= after);
    assert_eq!(end - start, 7 * DAY_MILLIS);

    let info = client.trial_info.unwrap();
    assert_eq!(info["trial_period_name"], "One week");
    assert_eq!(info["duration_days"], 7);
    Ok(())
}

#[tokio::test]
async fn provisioning_without_configured_period_falls_back_to_thirty_days() -> Result<()> {
    let db = setup_test_db().await?;
    let business = insert_business(&db, BusinessFixture::default()).await?;

    let outcome = TrialSynchronizer::new(&db)
        .provision_client_for_business(business.id)
        .await?;
    let ProvisionOutcome::Created { client_id } = outcome else {
        panic!("expected a created client, got {:?}", outcome);
    };

    let client = saas_client::Entity::find_by_id(client_id)
        .one(&db)
        .await?
        .unwrap();
    let start = client.trial_start_date.unwrap();
    let end = client.trial_end_date.unwrap();
    assert_eq!(end - start, 30 * DAY_MILLIS);

    let info = client.trial_info.unwrap();
    assert_eq!(info["trial_period_id"], "default");
    Ok(())
}

#[tokio::test]
async fn provisioning_twice_links_to_the_existing_client() -> Result<()> {
    let db = setup_test_db().await?;
    let business = insert_business(&db, BusinessFixture::default()).await?;

    let synchronizer = TrialSynchronizer::new(&db);
    let first = synchronizer
        .provision_client_for_business(business.id)
        .await?;
    let ProvisionOutcome::Created { client_id } = first else {
        panic!("expected a created client, got {:?}", first);
    };

    let second = synchronizer
        .provision_client_for_business(business.id)
        .await?;
    assert_eq!(second, ProvisionOutcome::AlreadyLinked { client_id });

    let clients = SaasClientRepository::new(&db).list_all().await?;
    assert_eq!(clients.len(), 1);
    Ok(())
}

#[tokio::test]
async fn provisioning_unknown_business_fails() -> Result<()> {
    let db = setup_test_db().await?;
    let missing = Uuid::new_v4();

    let result = TrialSynchronizer::new(&db)
        .provision_client_for_business(missing)
        .await;
    assert!(matches!(result, Err(SyncError::BusinessNotFound(id)) if id == missing));
    Ok(())
}
