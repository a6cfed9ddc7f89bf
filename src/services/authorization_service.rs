//! Política de autorización
//!
//! Todas las reglas de rol y de propiedad de la API pasan por `authorize`.
//! Los handlers resuelven el usuario (o su ausencia) y el recurso,
//! y piden una `Decision`.

use crate::models::auth::AuthContext;
use crate::models::booking::{Booking, BookingChanges, BookingStatus};
use crate::utils::errors::{forbidden_error, unauthenticated_error, AppResult};

/// Recurso al que se accede
#[derive(Debug, Clone, Copy)]
pub enum Resource<'a> {
    /// El catálogo de coches
    Fleet,
    /// Colección de reservas (listar, crear)
    Bookings,
    Booking(&'a Booking),
    /// Registro de tracking (la lectura la acota además el filtro de visibilidad)
    Tracking,
    /// Pago de la reserva indicada
    Payment(&'a Booking),
}

#[derive(Debug, Clone, Copy)]
pub enum Action<'a> {
    Read,
    Create,
    Update,
    Delete,
    Change(&'a BookingChanges),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    Unauthenticated,
    Forbidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(Denial),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// 401 / 403 como `AppError`
    pub fn into_result(self) -> AppResult<()> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(Denial::Unauthenticated) => Err(unauthenticated_error()),
            Decision::Deny(Denial::Forbidden) => Err(forbidden_error("Forbidden")),
        }
    }
}

fn allow_if(condition: bool) -> Decision {
    if condition {
        Decision::Allow
    } else {
        Decision::Deny(Denial::Forbidden)
    }
}

/// Un usuario no admin solo puede pasar su reserva a `cancelled`; el estado
/// de pago nunca lo fija él.
fn owner_may_apply(changes: &BookingChanges) -> bool {
    changes.payment_status.is_none()
        && matches!(changes.status, None | Some(BookingStatus::Cancelled))
}

pub fn authorize(caller: Option<&AuthContext>, resource: Resource<'_>, action: Action<'_>) -> Decision {
    // La lectura del catálogo es pública
    if let (Resource::Fleet, Action::Read) = (resource, action) {
        return Decision::Allow;
    }

    let Some(caller) = caller else {
        return Decision::Deny(Denial::Unauthenticated);
    };

    if caller.is_admin() {
        return Decision::Allow;
    }

    match (resource, action) {
        (Resource::Fleet, _) => Decision::Deny(Denial::Forbidden),
        (Resource::Bookings, Action::Read | Action::Create) => Decision::Allow,
        (Resource::Bookings, _) => Decision::Deny(Denial::Forbidden),
        (Resource::Booking(booking), Action::Read | Action::Delete) => {
            allow_if(caller.owns(booking.user_id))
        }
        (Resource::Booking(booking), Action::Change(changes)) => {
            allow_if(caller.owns(booking.user_id) && owner_may_apply(changes))
        }
        (Resource::Booking(_), _) => Decision::Deny(Denial::Forbidden),
        (Resource::Tracking, Action::Read | Action::Create) => Decision::Allow,
        (Resource::Tracking, _) => Decision::Deny(Denial::Forbidden),
        (Resource::Payment(booking), Action::Create) => allow_if(caller.owns(booking.user_id)),
        (Resource::Payment(_), _) => Decision::Deny(Denial::Forbidden),
    }
}
