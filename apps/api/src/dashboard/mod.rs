// Role dashboards. Every route here sits behind `auth::role_gate`.

pub mod handlers;
