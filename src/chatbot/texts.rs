//! Scripted Portuguese copy: menus, replies, reminder and follow-up texts.

use crate::chatbot::transport::MenuOption;

pub const OPT_CUSTOMER: MenuOption = MenuOption {
    id: "sou_cliente",
    title: "Sou Cliente",
};
pub const OPT_PROSPECT: MenuOption = MenuOption {
    id: "nao_sou_cliente",
    title: "Ainda Não Sou Cliente",
};
pub const OPT_CONTRACT: MenuOption = MenuOption {
    id: "configurar_contrato",
    title: "Configurar Contrato (Dev)",
};

pub const OPT_SLA: MenuOption = MenuOption {
    id: "suporte_sla",
    title: "Suporte SLA",
};
pub const OPT_CONTRACT_MATTERS: MenuOption = MenuOption {
    id: "contratual",
    title: "Questões Contratuais",
};

pub const OPT_REMOVE_REMINDER: MenuOption = MenuOption {
    id: "remover_agendamento",
    title: "Remover Agendamento",
};
pub const OPT_BACK_TO_MENU: MenuOption = MenuOption {
    id: "voltar_menu",
    title: "Voltar ao Menu",
};

pub const MAIN_MENU: &[MenuOption] = &[OPT_CUSTOMER, OPT_PROSPECT, OPT_CONTRACT];
pub const CUSTOMER_MENU: &[MenuOption] = &[OPT_SLA, OPT_CONTRACT_MATTERS];
pub const REMINDER_MENU: &[MenuOption] = &[OPT_REMOVE_REMINDER, OPT_BACK_TO_MENU];

pub const WELCOME: &str = "🤖 <b>Bem-vindo(a) à ITAC Desenvolvimento de Soluções \
    Informatizadas!</b> Sou seu assistente virtual. Em que posso te ajudar hoje?";

pub const CUSTOMER_WELCOME: &str = "🤝 Olá! Ótimo ter você de volta. O que você \
    precisa? Como posso melhor atendê-lo(a)?";

pub const SLA_REPLY: &str = "🚨 Entendido. Nosso time de Suporte SLA foi \
    notificado. Por favor, nos envie uma breve descrição do problema, e um \
    técnico entrará em contato com você em até 1 hora.";

pub const CONTRACT_REPLY: &str = "📝 Certo. Suas questões contratuais serão \
    encaminhadas para o setor administrativo. Em horário comercial, um \
    especialista responderá em até 2 horas. Por favor, especifique o contrato \
    ou o tópico de interesse.";

pub const PROSPECT_ACK: &str = "👋 Sem problemas! Estou feliz em ajudar a \
    iniciar sua jornada. Nós nos especializamos em soluções de software \
    personalizadas para pequenos negócios. Um de nossos consultores entrará em \
    contato com você em breve para entender melhor suas necessidades. Obrigado \
    pelo seu interesse!";

pub const ASK_REMINDER_NAME: &str = "Certo, iniciando configuração de follow-up \
    de contrato.\nPor favor, digite o <b>nome completo</b> da pessoa que deve \
    receber o follow-up de contrato:";

pub const REMINDER_REMOVED: &str =
    "❌ Agendamento de follow-up de contrato removido com sucesso!";

pub const NO_ACTIVE_REMINDER: &str = "Nenhum agendamento ativo encontrado.";

pub const FOLLOW_UP: &str = "Olá novamente! 👋 Aqui é da ITAC Soluções. \
    Gostaria de saber se você teve um tempo para pensar em nossas soluções \
    personalizadas para o seu pequeno negócio. Posso agendar uma conversa \
    rápida com um consultor esta semana? 💻";

pub const UNKNOWN_REPLY: &str = "🤔 Não entendi sua resposta. Por favor, digite \
    <b>olá</b> ou <b>menu</b> para ver as opções, ou tente selecionar uma das \
    opções anteriores.";

pub const APOLOGY: &str = "Tive um erro ao processar sua pergunta. Tente \
    novamente ou digite <b>menu</b> para ver as opções.";

pub fn reminder_exists(subject_name: &str) -> String {
    format!("Já existe um agendamento ativo para <b>{subject_name}</b>. O que deseja fazer?")
}

pub fn reminder_confirmed(subject_name: &str, hour: u32, minute: u32) -> String {
    format!(
        "✅ Agendamento concluído para <b>{subject_name}</b>!\n\n\
         Enviarei o lembrete semanal de contrato em dias úteis, às \
         <b>{hour:02}:{minute:02}</b>."
    )
}

pub fn reminder_message(subject_name: &str) -> String {
    format!(
        "<b>{subject_name}</b>, bom dia! Tudo bem?\n\n\
         Só passando para dar uma lembrada no contrato do sistema.\n\
         Teve chance de dar uma olhada ou tem alguma dúvida que eu possa \
         esclarecer? 😊"
    )
}

/// System prompt for the free-text answering capability.
pub const SYSTEM_PROMPT: &str = "\
Você é o Assistente Virtual Inteligente da ITAC Desenvolvimento de Soluções \
Informatizadas. Seu objetivo é ajudar pequenos empresários a entenderem como \
software pode melhorar seus negócios.

DIRETRIZES DE PERSONALIDADE:
- Tom: Profissional, empático, direto e encorajador.
- Linguagem: Evite termos técnicos excessivos. Se usar um (ex: 'API' ou \
'Cloud'), explique brevemente o benefício.
- Foco: Soluções personalizadas para pequenos negócios (Sistemas de gestão, \
automação de processos, integração de APIs).

REGRAS DE RESPOSTA:
1. Se o usuário perguntar o que você faz: Liste que a ITAC cria softwares sob \
medida para automatizar tarefas e facilitar a gestão.
2. Se o usuário pedir suporte técnico complexo: Oriente-o a digitar 'menu' e \
escolher 'Sou Cliente' e depois 'Suporte SLA'.
3. Se o usuário perguntar preços: Explique que cada projeto é único e que um \
consultor entrará em contato para fazer um orçamento gratuito.
4. Jamais invente parcerias ou serviços que não sejam desenvolvimento de \
software.
5. Sempre que terminar uma explicação longa, pergunte se o usuário gostaria de \
falar com um consultor humano.";
