//! Printable HTML for reports and prescriptions.

use prontio_protocol::{ConfiguracaoClinica, Laudo, Paciente, Receita};

pub fn escape_html(texto: &str) -> String {
    let mut out = String::with_capacity(texto.len());
    for c in texto.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escaped text with line breaks kept.
fn paragrafos(texto: &str) -> String {
    escape_html(texto.trim()).replace('\n', "<br>\n")
}

fn cabecalho(config: &ConfiguracaoClinica) -> String {
    let mut html = String::from("<header>\n");
    if !config.logo_url.trim().is_empty() {
        html.push_str(&format!(
            "<img class=\"logo\" src=\"{}\" alt=\"\">\n",
            escape_html(config.logo_url.trim())
        ));
    }
    if !config.clinica_nome.trim().is_empty() {
        html.push_str(&format!("<h1>{}</h1>\n", escape_html(config.clinica_nome.trim())));
    }
    let contato: Vec<String> = [&config.clinica_endereco, &config.clinica_telefone, &config.clinica_email]
        .into_iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(escape_html)
        .collect();
    if !contato.is_empty() {
        html.push_str(&format!("<p class=\"contato\">{}</p>\n", contato.join(" · ")));
    }
    html.push_str("</header>\n");
    html
}

fn assinatura(config: &ConfiguracaoClinica) -> String {
    let mut linhas = Vec::new();
    if !config.medico_nome_completo.trim().is_empty() {
        linhas.push(escape_html(config.medico_nome_completo.trim()));
    }
    if !config.medico_crm.trim().is_empty() {
        linhas.push(format!("CRM {}", escape_html(config.medico_crm.trim())));
    }
    if !config.medico_especialidade.trim().is_empty() {
        linhas.push(escape_html(config.medico_especialidade.trim()));
    }
    format!("<footer class=\"assinatura\">{}</footer>\n", linhas.join("<br>"))
}

fn documento(titulo: &str, corpo: &str, config: &ConfiguracaoClinica) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"pt-BR\">\n<head>\n<meta charset=\"utf-8\">\n<title>{titulo}</title>\n\
         <style>body{{font-family:sans-serif;margin:2cm}}header{{border-bottom:1px solid #999;margin-bottom:1em}}\
         .logo{{max-height:80px}}.assinatura{{margin-top:4em;text-align:center}}</style>\n\
         </head>\n<body>\n{cabecalho}<main>\n{corpo}</main>\n{assinatura}</body>\n</html>\n",
        titulo = escape_html(titulo),
        cabecalho = cabecalho(config),
        assinatura = assinatura(config),
    )
}

fn nome_paciente(paciente: Option<&Paciente>) -> String {
    paciente
        .map(|p| escape_html(p.nome_completo.trim()))
        .unwrap_or_default()
}

pub fn laudo_html(laudo: &Laudo, paciente: Option<&Paciente>, config: &ConfiguracaoClinica) -> String {
    let titulo = if laudo.titulo.trim().is_empty() {
        "Laudo"
    } else {
        laudo.titulo.trim()
    };
    let mut corpo = format!("<h2>{}</h2>\n", escape_html(titulo));
    corpo.push_str(&format!("<p class=\"paciente\">Paciente: {}</p>\n", nome_paciente(paciente)));
    if !laudo.tipo.trim().is_empty() {
        corpo.push_str(&format!("<p class=\"tipo\">Tipo: {}</p>\n", escape_html(laudo.tipo.trim())));
    }
    corpo.push_str(&format!("<div class=\"texto\">{}</div>\n", paragrafos(&laudo.texto)));
    if !laudo.observacoes.trim().is_empty() {
        corpo.push_str(&format!(
            "<div class=\"observacoes\">{}</div>\n",
            paragrafos(&laudo.observacoes)
        ));
    }
    documento(titulo, &corpo, config)
}

pub fn receita_html(receita: &Receita, paciente: Option<&Paciente>, config: &ConfiguracaoClinica) -> String {
    let mut corpo = String::from("<h2>Receituário</h2>\n");
    corpo.push_str(&format!("<p class=\"paciente\">Paciente: {}</p>\n", nome_paciente(paciente)));
    corpo.push_str(&format!(
        "<div class=\"medicamentos\">{}</div>\n",
        paragrafos(&receita.texto_medicamentos)
    ));
    if !receita.observacoes.trim().is_empty() {
        corpo.push_str(&format!(
            "<div class=\"observacoes\">{}</div>\n",
            paragrafos(&receita.observacoes)
        ));
    }
    documento("Receituário", &corpo, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markup_in_user_text_is_escaped() {
        assert_eq!(
            escape_html(r#"<script>alert("x")</script> & 'y'"#),
            "&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt; &amp; &#39;y&#39;"
        );
    }

    #[test]
    fn prescription_carries_header_patient_and_lines() {
        let config = ConfiguracaoClinica {
            clinica_nome: "Clínica Vida".into(),
            medico_nome_completo: "Dra. Ana Lima".into(),
            medico_crm: "12345-SP".into(),
            ..Default::default()
        };
        let paciente = Paciente {
            nome_completo: "José <Álvares>".into(),
            ..Default::default()
        };
        let receita = Receita {
            texto_medicamentos: "Dipirona 500mg\nTomar de 6/6h".into(),
            ..Default::default()
        };
        let html = receita_html(&receita, Some(&paciente), &config);
        assert!(html.contains("<h1>Clínica Vida</h1>"));
        assert!(html.contains("Paciente: José &lt;Álvares&gt;"));
        assert!(html.contains("Dipirona 500mg<br>\nTomar de 6/6h"));
        assert!(html.contains("CRM 12345-SP"));
    }

    #[test]
    fn untitled_report_uses_generic_title() {
        let laudo = Laudo {
            texto: "Exame normal.".into(),
            ..Default::default()
        };
        let html = laudo_html(&laudo, None, &ConfiguracaoClinica::default());
        assert!(html.contains("<title>Laudo</title>"));
        assert!(html.contains("<div class=\"texto\">Exame normal.</div>"));
        assert!(!html.contains("<img"));
    }
}
