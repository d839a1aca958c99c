//! HTTP API module for the attendance engine.
//!
//! This module provides the REST endpoints for registering punches, reading
//! daily and monthly summaries, building the recognition roster and
//! exporting attendance workbooks.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    DayQuery, ExportPeriod, ExportRequest, ManualPunchRequest, MonthQuery, PunchListRequest,
    RecognizedPunchRequest,
};
pub use response::{
    ApiError, ApiErrorResponse, ClassifyResponse, DailySummaryResponse, DayResponse,
    ExportResponse, MonthlyResponse, RegistrationResponse, RosterResponse, SheetResponse,
    SummaryResponse,
};
pub use state::AppState;
