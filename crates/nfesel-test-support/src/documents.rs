//! Sample NF-e payloads.

/// Identifier used by most fixtures, already normalised.
pub const CARRIER_CNPJ: &str = "12345678000199";
/// Identifier of a carrier that is never selected.
pub const OTHER_CNPJ: &str = "99999999999999";

/// Pretty-printed NF-e document whose carrier section declares `carrier_cnpj`.
#[must_use]
pub fn nfe_document(carrier_cnpj: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<nfeProc xmlns="http://www.portalfiscal.inf.br/nfe" versao="4.00">
  <NFe>
    <infNFe Id="NFe35170412345678000199550010000001231000001234" versao="4.00">
      <emit>
        <CNPJ>11222333000181</CNPJ>
        <xNome>Emitente Exemplo LTDA</xNome>
      </emit>
      <transp>
        <modFrete>0</modFrete>
        <transporta>
          <CNPJ>{carrier_cnpj}</CNPJ>
          <xNome>Transportadora Exemplo</xNome>
        </transporta>
      </transp>
    </infNFe>
  </NFe>
</nfeProc>
"#
    )
}

/// Single-line NF-e fragment, as emitted by minifying exporters.
#[must_use]
pub fn compact_nfe_document(carrier_cnpj: &str) -> String {
    format!("<NFe><transp><transporta><CNPJ>{carrier_cnpj}</CNPJ></transporta></transp></NFe>")
}

/// NF-e document without a carrier section.
#[must_use]
pub fn nfe_without_carrier() -> String {
    "<NFe><emit><CNPJ>12345678000199</CNPJ></emit></NFe>".to_string()
}
