use crate::fill::FillValues;
use crate::season::month_number;
use cropyield_core::format_number;

/// Inputs of [`prescriptive_advice`].
#[derive(Debug, Clone, PartialEq)]
pub struct AdviceInputs {
    pub district: String,
    pub crop: String,
    pub month: String,
    pub soil: String,
    pub fertilizer: String,
    pub rainfall: f64,
    pub temperature: f64,
    pub nitrogen: Option<f64>,
    pub phosphorus: Option<f64>,
    pub potassium: Option<f64>,
    pub ph: String,
    pub predicted_yield: String,
}

impl AdviceInputs {
    /// `None` unless rainfall and temperature are known numbers.
    pub fn from_fill(values: &FillValues) -> Option<Self> {
        let number = |v: &Option<String>| v.as_deref().and_then(|s| s.trim().parse::<f64>().ok());
        let text = |key: &str| values.placeholder(key).unwrap_or_default().to_string();
        Some(AdviceInputs {
            district: text("district"),
            crop: text("crop"),
            month: text("month"),
            soil: text("soil"),
            fertilizer: text("fertilizer"),
            rainfall: number(&values.rainfall)?,
            temperature: number(&values.temperature)?,
            nitrogen: number(&values.nitrogen),
            phosphorus: number(&values.phosphorus),
            potassium: number(&values.potassium),
            ph: text("ph"),
            predicted_yield: values.yield_value.clone(),
        })
    }
}

fn below(value: Option<f64>, limit: f64) -> bool {
    value.map_or(false, |v| v < limit)
}

/// Multi-line English advice, one line per concern: rainfall, month, water
/// split, fertilizer, pests, yield, water storage.
pub fn prescriptive_advice(input: &AdviceInputs) -> String {
    let AdviceInputs {
        district,
        crop,
        month,
        rainfall,
        temperature,
        ..
    } = input;
    let rain = format_number(*rainfall);
    let mut lines = Vec::with_capacity(7);

    lines.push(if *rainfall > 1000.0 {
        format!(
            "In {district}, very high rainfall ({rain} mm). Prefer water-loving crops (Rice, Sugarcane). \
             Store excess water in ponds/check-dams."
        )
    } else if *rainfall > 800.0 {
        format!("In {district}, rainfall is high ({rain} mm). Ensure drainage for {crop} and grow Soybean or Rice.")
    } else if *rainfall < 300.0 {
        format!(
            "In {district}, rainfall is very low ({rain} mm). Grow drought crops like Bajra, Jowar, Pulses. \
             Avoid water-intensive crops."
        )
    } else {
        format!("In {district}, rainfall is moderate ({rain} mm). Balanced crops like Wheat, Maize, Soybean are ideal.")
    });

    lines.push(match month_number(month) {
        Some(4..=6) => format!(
            "Since it is {month} (pre-monsoon), avoid long-duration crops. \
             Use short-term crops like Okra, Spinach, Green Gram until monsoon arrives."
        ),
        Some(7..=9) => format!("As it is {month} (monsoon), sow Kharif crops like {crop}, Soybean, Maize now."),
        Some(10..=12) => format!("In {month}, start Rabi crops like Wheat, Gram, Mustard."),
        _ => format!("In {month}, consult local agri-office for crop guidance."),
    });

    let allocation: [(&str, u32); 3] = if *rainfall > 800.0 {
        [(crop.as_str(), 70), ("Pulses", 20), ("Vegetables", 10)]
    } else if *rainfall < 300.0 {
        [(crop.as_str(), 40), ("Bajra", 40), ("Pulses", 20)]
    } else {
        [(crop.as_str(), 50), ("Maize", 30), ("Vegetables", 20)]
    };
    let split = allocation
        .iter()
        .map(|(name, share)| format!("{name}={share}"))
        .collect::<Vec<_>>()
        .join(", ");
    lines.push(format!(
        "Efficient irrigation: Divide 100 units water as → {split}. This ensures multiple crops without wastage."
    ));

    let mut nutrients = Vec::new();
    if below(input.nitrogen, 40.0) {
        nutrients.push("Add Urea (N source)".to_string());
    }
    if below(input.phosphorus, 20.0) {
        nutrients.push("Apply SSP (P source)".to_string());
    }
    if below(input.potassium, 20.0) {
        nutrients.push("Apply MOP (K source)".to_string());
    }
    if nutrients.is_empty() {
        nutrients.push(format!("Maintain balanced dose of {}", input.fertilizer));
    }
    lines.push(format!(
        "Soil={}, pH={}. Fertilizer advice: {}.",
        input.soil,
        input.ph,
        nutrients.join(", ")
    ));

    lines.push(if *temperature > 32.0 && *rainfall > 800.0 {
        format!("High humidity + heat → fungal risk. Use Trichoderma seed treatment in {district}.")
    } else if *temperature > 35.0 {
        format!("In {district}, hot weather → risk of stem borer in {crop}. Spray neem-based extract.")
    } else {
        format!("Monitor {crop} in {district} weekly for pest signs; use pheromone traps.")
    });

    lines.push(format!(
        "With given inputs, predicted yield for {crop} in {district} is {} quintals/acre.",
        input.predicted_yield
    ));

    lines.push(match district.trim().to_lowercase().as_str() {
        "kolhapur" | "satara" => "Extra: Invest in rainwater harvesting (farm ponds, check-dams).".to_string(),
        "jodhpur" => "Extra: Use borewells & drip irrigation to conserve water.".to_string(),
        _ => "Extra: Maintain wells & tanks to ensure year-round water.".to_string(),
    });

    lines.join("\n")
}

const NOISE: [&str; 5] = ["N/A", "Unknown", "not recorded", "None", "null"];

/// Strip placeholder noise left in a rendered reply.
pub fn clean_reply(text: &str) -> String {
    let mut out = text.to_string();
    for marker in NOISE {
        out = out.replace(marker, "").replace("  ", " ");
    }
    out.trim().to_string()
}
