use std::env;

use crate::{
  entity::BillingInterval,
  migration::Migrator,
  prelude::*,
  providers::{self, CustomerDirectory, PaymentCheck},
  sv,
};

#[derive(Debug, Clone)]
pub struct Plans {
  pub month: i64,
  pub semester: i64,
  pub year: i64,
  pub currency: String,
}

impl Plans {
  pub fn price(&self, interval: BillingInterval) -> i64 {
    match interval {
      BillingInterval::Month => self.month,
      BillingInterval::Semester => self.semester,
      BillingInterval::Year => self.year,
    }
  }
}

impl Default for Plans {
  fn default() -> Self {
    Self {
      month: 2_000,
      semester: 11_000,
      year: 20_000,
      currency: String::from("XOF"),
    }
  }
}

#[derive(Debug, Clone)]
pub struct Config {
  pub database_url: String,
  pub port: u16,
  pub stripe_secret_key: String,
  pub stripe_webhook_secret: String,
  pub cinetpay_api_key: String,
  pub cinetpay_site_id: String,
  pub cinetpay_check_url: String,
  pub provider_timeout: Duration,
  /// Maximum age of a signed webhook delivery
  pub webhook_tolerance: Duration,
  pub archive_page_size: u64,
  pub plans: Plans,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      database_url: String::from("sqlite:afrikipresse.db?mode=rwc"),
      port: 3000,
      stripe_secret_key: String::new(),
      stripe_webhook_secret: String::new(),
      cinetpay_api_key: String::new(),
      cinetpay_site_id: String::new(),
      cinetpay_check_url: String::from(providers::cinetpay::CHECK_URL),
      provider_timeout: Duration::from_secs(10),
      webhook_tolerance: Duration::from_secs(5 * 60),
      archive_page_size: 12,
      plans: Plans::default(),
    }
  }
}

fn required(name: &str) -> anyhow::Result<String> {
  env::var(name)
    .ok()
    .filter(|value| !value.trim().is_empty())
    .with_context(|| format!("{name} not set"))
}

fn parsed<T: std::str::FromStr>(name: &str, default: T) -> anyhow::Result<T>
where
  T::Err: std::error::Error + Send + Sync + 'static,
{
  match env::var(name) {
    Ok(value) => {
      value.trim().parse().with_context(|| format!("Invalid {name}"))
    }
    Err(_) => Ok(default),
  }
}

fn duration(name: &str, default: Duration) -> anyhow::Result<Duration> {
  match env::var(name) {
    Ok(value) => humantime::parse_duration(value.trim())
      .with_context(|| format!("Invalid {name} duration")),
    Err(_) => Ok(default),
  }
}

impl Config {
  pub fn from_env() -> anyhow::Result<Self> {
    let defaults = Self::default();

    Ok(Self {
      database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
      port: parsed("PORT", defaults.port)?,
      stripe_secret_key: required("STRIPE_SECRET_KEY")?,
      stripe_webhook_secret: required("STRIPE_WEBHOOK_SECRET")?,
      cinetpay_api_key: required("CINETPAY_API_KEY")?,
      cinetpay_site_id: required("CINETPAY_SITE_ID")?,
      cinetpay_check_url: env::var("CINETPAY_CHECK_URL")
        .unwrap_or(defaults.cinetpay_check_url),
      provider_timeout: duration(
        "PROVIDER_TIMEOUT",
        defaults.provider_timeout,
      )?,
      webhook_tolerance: duration(
        "WEBHOOK_TOLERANCE",
        defaults.webhook_tolerance,
      )?,
      archive_page_size: parsed(
        "ARCHIVE_PAGE_SIZE",
        defaults.archive_page_size,
      )?,
      plans: Plans {
        month: parsed("PLAN_PRICE_MONTH", defaults.plans.month)?,
        semester: parsed("PLAN_PRICE_SEMESTER", defaults.plans.semester)?,
        year: parsed("PLAN_PRICE_YEAR", defaults.plans.year)?,
        currency: env::var("PLAN_CURRENCY").unwrap_or(defaults.plans.currency),
      },
    })
  }
}

pub struct Services<'a> {
  pub user: sv::User<'a>,
  pub subscription: sv::Subscription<'a>,
  pub order: sv::Order<'a>,
  pub archive: sv::Archive<'a>,
  pub access: sv::Access<'a>,
}

pub struct AppState {
  pub db: DatabaseConnection,
  pub config: Config,
  /// Stripe customer lookups for the webhook mirror
  pub customers: Arc<dyn CustomerDirectory>,
  /// CinetPay status re-verification
  pub payments: Arc<dyn PaymentCheck>,
}

impl AppState {
  pub fn new(
    db: DatabaseConnection,
    config: Config,
    customers: Arc<dyn CustomerDirectory>,
    payments: Arc<dyn PaymentCheck>,
  ) -> Self {
    Self { db, config, customers, payments }
  }

  /// Connects to the database, runs migrations and builds the real
  /// provider clients.
  pub async fn connect(config: Config) -> anyhow::Result<Self> {
    info!("Connecting to database...");
    let db = Database::connect(&config.database_url)
      .await
      .context("Failed to connect to database")?;

    info!("Running migrations...");
    Migrator::up(&db, None).await.context("Failed to run migrations")?;

    let http = reqwest::Client::builder()
      .timeout(config.provider_timeout)
      .build()
      .context("Failed to build HTTP client")?;

    let customers = Arc::new(providers::Stripe::new(
      http.clone(),
      config.stripe_secret_key.clone(),
    ));
    let payments = Arc::new(providers::CinetPay::new(
      http,
      config.cinetpay_check_url.clone(),
      config.cinetpay_api_key.clone(),
      config.cinetpay_site_id.clone(),
    ));

    Ok(Self::new(db, config, customers, payments))
  }

  pub fn sv(&self) -> Services<'_> {
    Services {
      user: sv::User::new(&self.db),
      subscription: sv::Subscription::new(&self.db),
      order: sv::Order::new(&self.db),
      archive: sv::Archive::new(&self.db),
      access: sv::Access::new(&self.db),
    }
  }
}
