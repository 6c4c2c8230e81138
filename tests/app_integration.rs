use rust_decimal::Decimal;
use std::fs;
use std::path::{Path, PathBuf};
use subtrack::core::actions::SubscriptionInput;
use subtrack::core::config::AppConfig;
use subtrack::core::model::{Frequency, SubscriptionStatus};
use subtrack::core::rates::RateSource;
use subtrack::core::repository::Repository;
use subtrack::{AppCommand, AppContext};
use tracing::info;

mod test_utils {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub async fn create_rates_server(base: &str, status: u16, body: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/v4/latest/{base}")))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&mock_server)
            .await;
        mock_server
    }
}

fn write_config(dir: &Path, rates_url: &str, currency: &str) -> PathBuf {
    let config_path = dir.join("config.yaml");
    let config_content = format!(
        r#"
        user:
          id: "tester"
          email: "tester@example.com"
        currency: "{currency}"
        providers:
          rates:
            source: exchange_rate_api
            base_url: "{rates_url}"
        data_path: "{}"
    "#,
        dir.join("data").display()
    );
    fs::write(&config_path, config_content).expect("Failed to write config file");
    config_path
}

fn input(name: &str, cost: i64, currency: &str, frequency: Frequency) -> SubscriptionInput {
    SubscriptionInput {
        name: name.to_string(),
        cost: Decimal::from(cost),
        currency: currency.to_string(),
        frequency: Some(frequency),
        start_date: chrono::NaiveDate::from_ymd_opt(2024, 1, 15),
        ..Default::default()
    }
}

#[test_log::test(tokio::test)]
async fn test_dashboard_in_preferred_currency() {
    let mock_server = test_utils::create_rates_server(
        "PHP",
        200,
        r#"{"base": "PHP", "rates": {"PHP": 1, "USD": 0.017}}"#,
    )
    .await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = write_config(dir.path(), &mock_server.uri(), "PHP");

    let config = AppConfig::load_from_path(&config_path).unwrap();
    let ctx = AppContext::open(config).unwrap();
    let actions = ctx.actions();
    assert!(actions.add(&input("Netflix", 100, "PHP", Frequency::Monthly)).await.success);
    assert!(actions.add(&input("AWS", 1200, "PHP", Frequency::Yearly)).await.success);

    let summary = ctx.dashboard().await.unwrap();
    info!(?summary, "Dashboard computed");
    assert_eq!(summary.base_currency, "PHP");
    assert_eq!(summary.rate_source, RateSource::Live);
    assert_eq!(summary.monthly_burn, Decimal::from(200));
    assert_eq!(summary.annual_projection, Decimal::from(2400));
    assert_eq!(summary.active_trials, 0);
    assert!(summary.alerts.is_empty());
    assert_eq!(summary.forecast.len(), 6);
}

#[test_log::test(tokio::test)]
async fn test_rates_are_fetched_once_per_ttl() {
    let mock_server = wiremock::MockServer::start().await;
    wiremock::Mock::given(wiremock::matchers::method("GET"))
        .and(wiremock::matchers::path("/v4/latest/USD"))
        .respond_with(
            wiremock::ResponseTemplate::new(200)
                .set_body_string(r#"{"rates": {"USD": 1, "EUR": 0.9}}"#),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = write_config(dir.path(), &mock_server.uri(), "USD");

    let ctx = AppContext::open(AppConfig::load_from_path(&config_path).unwrap()).unwrap();
    ctx.actions()
        .add(&input("Spotify", 10, "EUR", Frequency::Monthly))
        .await;

    let first = ctx.dashboard().await.unwrap();
    let second = ctx.dashboard().await.unwrap();
    assert_eq!(first.monthly_burn, second.monthly_burn);
    assert_eq!(first.monthly_burn.round_dp(2), Decimal::new(1111, 2));
}

#[test_log::test(tokio::test)]
async fn test_dashboard_falls_back_when_rates_unavailable() {
    let mock_server = test_utils::create_rates_server("USD", 500, "").await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = write_config(dir.path(), &mock_server.uri(), "USD");

    let ctx = AppContext::open(AppConfig::load_from_path(&config_path).unwrap()).unwrap();
    ctx.actions()
        .add(&input("GitHub", 4, "USD", Frequency::Monthly))
        .await;
    ctx.actions()
        .add(&input("Domain", 12, "USD", Frequency::Yearly))
        .await;

    let summary = ctx.dashboard().await.unwrap();
    assert_eq!(summary.rate_source, RateSource::Fallback);
    assert_eq!(summary.monthly_burn, Decimal::from(5));
}

#[test_log::test(tokio::test)]
async fn test_archive_restore_and_export() {
    let mock_server = test_utils::create_rates_server(
        "USD",
        200,
        r#"{"rates": {"USD": 1}}"#,
    )
    .await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = write_config(dir.path(), &mock_server.uri(), "USD");
    let ctx = AppContext::open(AppConfig::load_from_path(&config_path).unwrap()).unwrap();

    let id = ctx
        .actions()
        .add(&input("Hulu", 8, "USD", Frequency::Monthly))
        .await
        .id
        .unwrap();
    let short = id.to_string()[..8].to_string();

    subtrack::execute(&ctx, AppCommand::Archive { id: short.clone() })
        .await
        .unwrap();
    let graveyard = ctx.dashboard().await.unwrap().graveyard;
    assert_eq!(graveyard.count, 1);
    assert_eq!(graveyard.total_saved_monthly, Decimal::from(8));

    let again = subtrack::execute(&ctx, AppCommand::Archive { id: short.clone() }).await;
    assert_eq!(
        again.unwrap_err().to_string(),
        "Only active subscriptions can be archived."
    );

    subtrack::execute(&ctx, AppCommand::Restore { id: short }).await.unwrap();
    let sub = ctx.repo.get_subscription(id).await.unwrap().unwrap();
    assert_eq!(sub.status, SubscriptionStatus::Active);
    assert!(sub.next_renewal_date >= ctx.today);

    let export_path = dir.path().join("export.json");
    subtrack::execute(
        &ctx,
        AppCommand::Export {
            output: Some(export_path.clone()),
        },
    )
    .await
    .unwrap();
    let exported: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&export_path).unwrap()).unwrap();
    assert_eq!(exported[0]["Vendor"], "Hulu");
    assert_eq!(exported[0]["Start Date"], "Jan 15, 2024");
}

#[test_log::test(tokio::test)]
async fn test_full_app_flow_with_mock() {
    let mock_server = test_utils::create_rates_server(
        "EUR",
        200,
        r#"{"rates": {"EUR": 1, "USD": 1.08}}"#,
    )
    .await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = write_config(dir.path(), &mock_server.uri(), "EUR");

    let result =
        subtrack::run_command(AppCommand::Dashboard, Some(config_path.to_str().unwrap())).await;
    assert!(
        result.is_ok(),
        "Main function failed with: {:?}",
        result.err()
    );
}

#[test_log::test(tokio::test)]
async fn test_missing_config_is_an_error() {
    let result =
        subtrack::run_command(AppCommand::Dashboard, Some("/nonexistent/config.yaml")).await;
    assert!(
        result
            .unwrap_err()
            .to_string()
            .contains("Failed to read config file")
    );
}
