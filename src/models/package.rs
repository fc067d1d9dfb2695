use serde::{Deserialize, Serialize};

/// Paquete de viaje (una búsqueda por ciudad que se puede comprar)
#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TravelPackage {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub city_id: String,
    pub city_name: String,
    pub price: f64,
    pub currency: String,
    #[serde(default)]
    pub duration_days: Option<u32>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub purchased: bool,
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseResponse {
    pub order_id: String,
    /// Página de pago externa; el proveedor vuelve a la app con un deep link
    pub payment_url: String,
    pub status: String,
}
