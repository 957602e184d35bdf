//! Shared application state.

use std::sync::Arc;

use screenbook_auth::{AccountService, AuthConfig, DownloadLinks, OtpService};
use screenbook_booking::{BookingService, CapacityManager, EventCatalogue, ResultService};
use screenbook_db::DbManager;
use screenbook_db::repository::{
    SurrealAdminRepository, SurrealBookingRepository, SurrealEventRepository,
    SurrealOtpRepository, SurrealParticipantRepository, SurrealResultRepository,
};
use surrealdb::engine::any::Any;

use crate::config::ServerConfig;
use crate::sms::SmsGateway;
use crate::storage::LocalFileStore;

type Events = SurrealEventRepository<Any>;
type Bookings = SurrealBookingRepository<Any>;
type Participants = SurrealParticipantRepository<Any>;
type Sms = Arc<SmsGateway>;

pub type Otp = OtpService<SurrealOtpRepository<Any>, Sms>;
pub type Accounts = AccountService<Participants, SurrealAdminRepository<Any>, Arc<Otp>>;
pub type Catalogue = EventCatalogue<Events, Bookings>;
pub type BookingFlow = BookingService<Events, Bookings, Participants, Sms>;
pub type Results = ResultService<
    Bookings,
    SurrealResultRepository<Any>,
    Events,
    Participants,
    Arc<LocalFileStore>,
    Sms,
    Arc<Otp>,
    DownloadLinks,
>;

/// Everything a handler needs. Cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub db: DbManager,
    pub auth: Arc<AuthConfig>,
    pub otp: Arc<Otp>,
    pub accounts: Arc<Accounts>,
    pub catalogue: Arc<Catalogue>,
    pub bookings: Arc<BookingFlow>,
    pub results: Arc<Results>,
    pub sms: Sms,
}

impl AppState {
    /// Wires the services over one database connection. Migrations must
    /// already have run.
    pub fn new(db: DbManager, config: &ServerConfig, sms: SmsGateway) -> Self {
        let client = db.client().clone();
        let sms = Arc::new(sms);

        let events = SurrealEventRepository::new(client.clone());
        let bookings = SurrealBookingRepository::new(client.clone());
        let participants = SurrealParticipantRepository::new(client.clone());
        let admins = match &config.auth.pepper {
            Some(pepper) => SurrealAdminRepository::with_pepper(client.clone(), pepper.clone()),
            None => SurrealAdminRepository::new(client.clone()),
        };

        let otp = Arc::new(OtpService::new(
            SurrealOtpRepository::new(client.clone()),
            sms.clone(),
            config.otp.clone(),
        ));
        let accounts = AccountService::new(
            participants.clone(),
            admins,
            otp.clone(),
            config.auth.clone(),
            config.otp.clone(),
        );

        let capacity = CapacityManager::new(events.clone());
        let catalogue = EventCatalogue::new(capacity.clone(), bookings.clone());
        let booking_flow =
            BookingService::new(capacity, bookings.clone(), participants.clone(), sms.clone());
        let results = ResultService::new(
            bookings,
            SurrealResultRepository::new(client),
            events,
            participants,
            Arc::new(LocalFileStore::new(config.storage_dir.clone())),
            sms.clone(),
            otp.clone(),
            DownloadLinks::new(config.public_base_url.clone(), config.auth.clone()),
        );

        Self {
            db,
            auth: Arc::new(config.auth.clone()),
            otp,
            accounts: Arc::new(accounts),
            catalogue: Arc::new(catalogue),
            bookings: Arc::new(booking_flow),
            results: Arc::new(results),
            sms,
        }
    }
}
