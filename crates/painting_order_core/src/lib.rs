pub mod catalog;
pub mod domain;
pub mod error;
pub mod ports;
pub mod preview;
pub mod pricing;
pub mod session;
pub mod wizard;

pub use domain::{
    CanvasSize, DraftUpdate, Identity, Material, NewOrder, Order, OrderDraft, OrderStatus,
    PaintingStyle, PreviewImage, PriceBreakdown, ReferenceImage,
};
pub use error::{ErrorKind, WizardError, WizardResult};
pub use ports::{
    IdentityProvider, OrderStore, PortError, PortResult, PreviewGenerationService,
    StyleCatalogService, StyleRecord,
};
pub use session::{SessionContext, SessionGate};
pub use wizard::{OrderWizard, WizardPorts, WizardSnapshot, WizardStep};
